use std::time::Duration;
use log::info;
use tokio::time::sleep;
use crate::error::{CatalogError, EnrollError};
use crate::models::{Course, EnrolledCourse, Principal};
use crate::utils::catalog::CatalogClient;

// Mock progress shown for the dashboard's courses, in catalog order.
const MOCK_PROGRESS: [u8; 4] = [25, 60, 85, 40];
pub const CERTIFICATES_EARNED: u32 = 2;
pub const LEARNING_HOURS: f64 = 24.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub greeting: String,
    pub courses: Vec<EnrolledCourse>,
    pub completed: u32,
    pub learning_hours: f64,
}

/// Simulated enrollment: checks that someone is signed in and waits `delay`.
/// Nothing is recorded anywhere.
pub async fn enroll(
    principal: Option<&Principal>,
    course: &Course,
    delay: Duration,
) -> Result<(), EnrollError> {
    let principal = principal.ok_or(EnrollError::AuthenticationRequired)?;
    sleep(delay).await;
    info!("{} enrolled in course {}", principal.uid, course.id);
    Ok(())
}

pub async fn dashboard(principal: &Principal, catalog: &CatalogClient) -> Result<Dashboard, CatalogError> {
    let courses = catalog.fetch_first(MOCK_PROGRESS.len()).await?;
    Ok(build_dashboard(principal, courses))
}

fn build_dashboard(principal: &Principal, courses: Vec<Course>) -> Dashboard {
    let courses = courses
        .into_iter()
        .zip(MOCK_PROGRESS)
        .map(|(course, progress)| EnrolledCourse {
            id: course.id,
            title: course.title,
            image: course.image,
            category: course.category,
            progress,
        })
        .collect();

    Dashboard {
        greeting: principal.greeting_name(),
        courses,
        completed: CERTIFICATES_EARNED,
        learning_hours: LEARNING_HOURS,
    }
}
