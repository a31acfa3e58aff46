//! Scenario group to Playwright test skeleton conversion.

pub mod keywords;
pub mod outline;
pub mod playwright;

pub use keywords::*;
pub use outline::*;
pub use playwright::*;
