use copypasta::{ClipboardContext, ClipboardProvider};

pub fn read() -> Result<String, String> {
    let mut clip = ClipboardContext::new().map_err(|e| format!("Clipboard error: {}", e))?;
    clip.get_contents()
        .map_err(|e| format!("Clipboard read error: {}", e))
}

pub fn write(content: &str) -> Result<(), String> {
    let mut clip = ClipboardContext::new().map_err(|e| format!("Clipboard error: {}", e))?;
    clip.set_contents(content.to_string())
        .map_err(|e| format!("Clipboard set error: {}", e))
}
