//! Showing the expenses and reading the user's instruction.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Renders the intro shown before asking for an instruction.
pub fn render_intro(data: &str) -> String {
    format!(
        "Here is the expenses data in your file:\n\n{data}\n\n\
         What would you like me to do with it?\n\n"
    )
}

/// Reads one line of instruction from the user, without its line
/// terminator.
///
/// The end of input, or a failing read, yields an empty instruction.
pub async fn collect_prompt<R: AsyncBufRead + Unpin>(reader: &mut R) -> String {
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) => {
            debug!("input closed before a prompt was entered");
            String::new()
        }
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            line
        }
        Err(err) => {
            warn!("failed to read the prompt: {err}");
            String::new()
        }
    }
}
