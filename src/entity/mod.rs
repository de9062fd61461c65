pub mod issue;
pub mod issue_history;
pub mod issue_partner;
pub mod partner_project;
pub mod phone_category;
pub mod phone_support;
pub mod project;
pub mod project_member;
pub mod user;
pub mod user_preference;
