use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_string_to_file(path: impl AsRef<Path>, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path.as_ref())?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
