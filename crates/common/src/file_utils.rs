use std::path::Path;

/// Error type for filename validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    ContainsParentTraversal,
    InvalidFileName,
    ContainsInvalidCharacters,
}

impl FilenameValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            FilenameValidationError::Empty => "Filename cannot be empty",
            FilenameValidationError::ContainsNullByte => "Filename cannot contain null bytes",
            FilenameValidationError::ContainsPathSeparator => {
                "Filename cannot contain path separators (/ or \\)"
            }
            FilenameValidationError::IsSpecialDirectory => "Filename cannot be '.' or '..'",
            FilenameValidationError::ContainsParentTraversal => {
                "Filename cannot contain a '..' path segment"
            }
            FilenameValidationError::InvalidFileName => {
                "Invalid filename: must be a valid file name"
            }
            FilenameValidationError::ContainsInvalidCharacters => {
                "Invalid filename: contains invalid characters"
            }
        }
    }
}

impl std::fmt::Display for FilenameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FilenameValidationError {}

/// Validate a bare filename so it can be joined onto the storage directory
/// Checks if:
/// - Filename contains no path separators (/, \)
/// - Path::new(filename).file_name() returns Some(_)
/// - Filename is not empty
/// - Filename is not "." or ".."
pub fn validate_filename(filename: &str) -> Result<(), FilenameValidationError> {
    if filename.is_empty() {
        return Err(FilenameValidationError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameValidationError::ContainsNullByte);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameValidationError::ContainsPathSeparator);
    }

    if filename == "." || filename == ".." {
        return Err(FilenameValidationError::IsSpecialDirectory);
    }

    let path = Path::new(filename);
    if path.file_name().is_none() {
        return Err(FilenameValidationError::InvalidFileName);
    }

    // file_name() must not normalize the name into something else
    if path.file_name().and_then(|n| n.to_str()) != Some(filename) {
        return Err(FilenameValidationError::ContainsInvalidCharacters);
    }

    Ok(())
}

/// Last path segment of `name`, treating both `/` and `\` as separators
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Reduce a client-supplied name to a basename that is safe to look up.
///
/// Names carrying a `..` segment anywhere are rejected outright instead of
/// being reduced, so `../secret.txt` never turns into a lookup of
/// `secret.txt`.
pub fn sanitize_requested_name(name: &str) -> Result<&str, FilenameValidationError> {
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(FilenameValidationError::ContainsParentTraversal);
    }
    let base = basename(name);
    validate_filename(base)?;
    Ok(base)
}

/// Split a filename into base and extension.
///
/// The extension keeps its leading dot. A name whose only dot is the first
/// character (e.g. `.bashrc`) has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Candidate name for attempt number `attempt`: `base.ext`, `base_1.ext`, ...
pub fn numbered_name(base: &str, ext: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}{}", base, ext)
    } else {
        format!("{}_{}{}", base, attempt, ext)
    }
}

/// Best-effort repair of a filename whose UTF-8 bytes were decoded as Latin-1.
///
/// Multipart clients on some platforms send UTF-8 filenames that end up
/// decoded one byte per char. If every char fits in a byte, the bytes are
/// re-read as UTF-8. Anything that does not decode, or decodes to nothing,
/// keeps the declared name. A name that really is Latin-1 and happens to
/// form valid UTF-8 will be misread.
pub fn recover_utf8_name(declared: &str) -> String {
    let bytes: Option<Vec<u8>> = declared
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    match bytes.map(String::from_utf8) {
        Some(Ok(recovered)) if !recovered.is_empty() => recovered,
        _ => declared.to_string(),
    }
}
