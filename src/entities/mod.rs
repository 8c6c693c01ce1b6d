pub mod email_signups;
