//! Tools the expense agent offers to the model.

mod send_email;

pub use send_email::{SendEmailParameters, SendEmailTool, render_email};
