use crate::error::AuthError;
use crate::models::{Course, CourseId, ProviderKind};
use crate::utils::enrollment::Dashboard;

// Builds the listing shown by `courses` and `favorites`.
pub fn course_listing(courses: &[&Course], is_favorite: impl Fn(CourseId) -> bool) -> String {
    if courses.is_empty() {
        return String::from("No courses found matching your search.\n");
    }

    let noun = if courses.len() == 1 { "course" } else { "courses" };
    let mut message = format!("Showing {} {}\n\n", courses.len(), noun);
    for course in courses {
        let heart = if is_favorite(course.id) { "♥" } else { " " };
        message.push_str(&format!(
            "{} #{:<4} {}  ${:.2}  [{}]\n",
            heart, course.id, course.title, course.price, course.category
        ));
    }
    message
}

pub fn course_details(course: &Course, favorite: bool) -> String {
    let mut message = format!("{}\n", course.title);
    message.push_str(&format!(
        "[{}] {}  ★ {} ({} reviews)\n\n",
        course.category,
        if favorite { "♥ Saved" } else { "♡ Save" },
        course.rating.rate,
        course.rating.count
    ));
    message.push_str(&format!("{}\n\n", course.description));
    message.push_str(&format!("Price: ${:.2} (one-time payment, lifetime access)\n", course.price));
    message.push_str(&format!("Image: {}\n", course.image));
    message
}

pub fn category_list(categories: &[&str]) -> String {
    let mut message = String::from("all\n");
    for category in categories {
        message.push_str(category);
        message.push('\n');
    }
    message
}

pub fn dashboard_summary(dashboard: &Dashboard) -> String {
    let mut message = format!("Welcome back, {}!\n\n", dashboard.greeting);
    message.push_str(&format!("Enrolled courses: {}\n", dashboard.courses.len()));
    message.push_str(&format!("Completed:        {}\n", dashboard.completed));
    message.push_str(&format!("Learning hours:   {}\n\n", dashboard.learning_hours));

    if dashboard.courses.is_empty() {
        message.push_str("No enrolled courses yet. Start learning by enrolling in a course.\n");
        return message;
    }

    message.push_str("My Courses\n");
    for course in &dashboard.courses {
        let filled = usize::from(course.progress) / 10;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(10 - filled.min(10)));
        message.push_str(&format!(
            "  #{:<4} [{}] {:>3}%  {} ({})\n",
            course.id, bar, course.progress, course.title, course.category
        ));
    }
    message
}

/// User-facing text for a failed sign-in or sign-up.
pub fn auth_error_message(error: &AuthError, provider: Option<ProviderKind>) -> String {
    let via = provider.map(|p| p.to_string()).unwrap_or_else(|| "this provider".to_string());
    match error {
        AuthError::InvalidCredential => {
            "Login failed. Please check your email and password and try again.".to_string()
        }
        AuthError::EmailAlreadyInUse => {
            "This email may already be in use. Please try a different email.".to_string()
        }
        AuthError::WeakPassword => "Password must be at least 6 characters long.".to_string(),
        AuthError::PasswordMismatch => "Please make sure both passwords are identical.".to_string(),
        AuthError::PopupDismissed => "Login cancelled before it was completed.".to_string(),
        AuthError::PopupBlocked => format!("Please allow popups to sign in with {via}."),
        AuthError::DomainUnauthorized => format!(
            "Sign-in with {via} requires domain authorization. Use email/password login or add this \
             domain to the identity provider's authorized domains."
        ),
        AuthError::ProviderUnconfigured => format!(
            "Sign-in with {via} is not configured. Enable it in the identity provider's sign-in methods \
             and provide the required credentials."
        ),
        AuthError::Network(detail) => format!("Could not reach the identity provider: {detail}"),
        AuthError::Unknown(detail) if detail.is_empty() => {
            "An unexpected error occurred. Please try again.".to_string()
        }
        AuthError::Unknown(detail) => format!("Sign-in failed: {detail}"),
    }
}
