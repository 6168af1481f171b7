/*!
 * Core Data Structures
 * Specialized containers for the instrumentation layer
 */

mod inline_string;

pub use inline_string::InlineString;
