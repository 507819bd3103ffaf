mod custom_field;
mod merge_vars;
mod sanitizer;
mod submission;
mod subscribe_response;
mod subscriber_email;
// allow external `use` statements to skip `submission` etc
pub use custom_field::CustomField;
pub use merge_vars::MergeVars;
pub use sanitizer::Sanitizer;
pub use submission::Submission;
pub use submission::ACTION_FIELD;
pub use submission::EMAIL_FIELD;
pub use submission::NONCE_FIELD;
pub use submission::SUBSCRIBE_ACTION;
pub use subscribe_response::SubscribeResponse;
pub use subscriber_email::SubscriberEmail;
