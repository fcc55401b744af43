//! Assorted utility functions and structures shared across the crate.

use std::{
    cell::RefCell,
    fs::File,
    io::{Read, Write},
    path::Path,
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::error::Error;

/// Shared mutable type able to be passed between types, allowing for
/// circular referencing and interior mutability on a single thread.
pub type SharedMut<T> = Rc<RefCell<T>>;

/// Shared thread type able to be passed between threads.
///
/// Significant performance overhead compared to [`SharedMut`], used only
/// where configuration needs to be visible from outside the pump loop.
pub type SharedThread<T> = Arc<Mutex<T>>;

/// Reads the contents of the file at the given path into a vector of bytes.
pub fn read_file(path: &str) -> Result<Vec<u8>, Error> {
    let mut file = File::open(path).map_err(|_| Error::Open(path.to_string()))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|_| Error::Read(path.to_string()))?;
    Ok(data)
}

/// Writes the given data to the file at the given path, truncating any
/// previous contents.
pub fn write_file(path: &str, data: &[u8], flush: Option<bool>) -> Result<(), Error> {
    let mut file = File::create(path).map_err(|_| Error::Open(path.to_string()))?;
    file.write_all(data)
        .map_err(|_| Error::Write(path.to_string()))?;
    if flush.unwrap_or(true) {
        file.flush().map_err(|_| Error::Write(path.to_string()))?;
    }
    Ok(())
}

/// Replaces the extension in the given path with the provided extension.
///
/// This allows simple associated-file discovery, e.g. locating `rom.sav`
/// next to `rom.gb`.
pub fn replace_ext(path: &str, new_extension: &str) -> Option<String> {
    let file_path = Path::new(path);
    let parent_dir = file_path.parent()?;
    let file_stem = file_path.file_stem()?;
    let file_extension = file_path.extension()?;
    if file_stem == file_extension {
        return None;
    }
    let new_file_name = format!("{}.{}", file_stem.to_str()?, new_extension);
    let new_file_path = parent_dir.join(new_file_name);
    Some(String::from(new_file_path.to_str()?))
}

/// Capitalizes the first character in the provided string.
pub fn capitalize(string: &str) -> String {
    let mut chars = string.chars();
    match chars.next() {
        None => String::new(),
        Some(chr) => chr.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

pub fn timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now();
    now.duration_since(UNIX_EPOCH).unwrap().as_secs()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{capitalize, replace_ext};

    #[test]
    fn test_change_extension() {
        let new_path = replace_ext("/path/to/rom.gb", "sav").unwrap();
        assert_eq!(
            new_path,
            Path::new("/path/to").join("rom.sav").to_str().unwrap()
        );

        let new_path = replace_ext("/path/to/directory/", "sav");
        assert_eq!(new_path, None);
    }

    #[test]
    fn test_capitalize_empty_string() {
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_capitalize_single_character() {
        assert_eq!(capitalize("a"), "A");
    }

    #[test]
    fn test_capitalize_multiple_characters() {
        assert_eq!(capitalize("hello, world!"), "Hello, world!");
    }
}
