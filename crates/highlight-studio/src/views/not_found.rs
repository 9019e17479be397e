//! Catch-all page.

use crate::routes::Route;

pub fn render(path: &str) -> String {
    format!(
        "404 - Page Not Found\n\
         The page you are looking for doesn't exist or has been moved. ({})\n\n\
         -> Back to Dashboard: {}\n",
        path,
        Route::Dashboard
    )
}
