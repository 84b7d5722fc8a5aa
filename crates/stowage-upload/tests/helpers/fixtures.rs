use stowage_upload::FileBlob;

/// A small text file.
pub fn text_file(name: &str) -> FileBlob {
    FileBlob::new(name, "text/plain", format!("contents of {}", name).into_bytes())
}

/// A 1x1 transparent PNG.
pub fn png_file(name: &str) -> FileBlob {
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89,
    ];
    FileBlob::new(name, "image/png", PNG)
}
