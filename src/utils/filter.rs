use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use icu_collator::{Collator, CollatorOptions};
use log::warn;
use crate::models::Course;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    fn accepts(&self, course: &Course) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(label) => course.category == *label,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    ByName,
    PriceAscending,
    PriceDescending,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by-name" | "name" => Ok(SortMode::ByName),
            "price-ascending" | "price-low" => Ok(SortMode::PriceAscending),
            "price-descending" | "price-high" => Ok(SortMode::PriceDescending),
            other => Err(format!(
                "unknown sort mode '{other}' (expected name, price-low or price-high)"
            )),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortMode::ByName => "by-name",
            SortMode::PriceAscending => "price-ascending",
            SortMode::PriceDescending => "price-descending",
        };
        f.write_str(label)
    }
}

/// Derives the displayed courses from the full catalog.
///
/// Category first, then a case-insensitive substring match of the trimmed
/// query against title, description and category, then a stable sort.
/// The result borrows from `catalog`, so it can never hold a course the
/// catalog does not.
pub fn visible_courses<'a>(
    catalog: &'a [Course],
    query: &str,
    category: &CategoryFilter,
    sort: SortMode,
) -> Vec<&'a Course> {
    let needle = query.trim().to_lowercase();

    let mut visible: Vec<&Course> = catalog
        .iter()
        .filter(|course| category.accepts(course))
        .filter(|course| needle.is_empty() || matches_query(course, &needle))
        .collect();

    // sort_by is stable: equal prices keep catalog order.
    match sort {
        SortMode::ByName => sort_by_title(&mut visible),
        SortMode::PriceAscending => visible.sort_by(|a, b| compare_price(a.price, b.price)),
        SortMode::PriceDescending => visible.sort_by(|a, b| compare_price(b.price, a.price)),
    }

    visible
}

// Distinct categories in the order they first appear.
pub fn categories(catalog: &[Course]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for course in catalog {
        if !seen.contains(&course.category.as_str()) {
            seen.push(&course.category);
        }
    }
    seen
}

fn matches_query(course: &Course, needle: &str) -> bool {
    course.title.to_lowercase().contains(needle)
        || course.description.to_lowercase().contains(needle)
        || course.category.to_lowercase().contains(needle)
}

// Root-locale collation at tertiary strength: accents outweigh case,
// lowercase precedes uppercase, punctuation sorts before digits and letters.
fn sort_by_title(courses: &mut [&Course]) {
    match Collator::try_new(&Default::default(), CollatorOptions::new()) {
        Ok(collator) => courses.sort_by(|a, b| collator.compare(&a.title, &b.title)),
        Err(e) => {
            warn!("Title collation unavailable, sorting by code point: {}", e);
            courses.sort_by(|a, b| a.title.cmp(&b.title));
        }
    }
}

fn compare_price(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
