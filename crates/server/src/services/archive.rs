use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Bundle `file_path` into `<output_dir>/<name>.tar`, compress it to
/// `<name>.tar.zst` at the maximum zstd level, and remove the
/// intermediate tar. Returns the compressed artifact's path.
pub fn compress_tar_zst(file_path: &Path, output_dir: &Path) -> io::Result<PathBuf> {
    let file_name = file_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    let mut tar_name = file_name.to_os_string();
    tar_name.push(".tar");
    let tar_path = output_dir.join(&tar_name);

    let mut zst_name = tar_name.clone();
    zst_name.push(".zst");
    let zst_path = output_dir.join(&zst_name);

    // The archive holds the single file under its own basename.
    let mut builder = tar::Builder::new(File::create(&tar_path)?);
    builder.append_path_with_name(file_path, Path::new(file_name))?;
    builder.finish()?;
    drop(builder);

    let level = *zstd::compression_level_range().end();
    let tar_file = File::open(&tar_path)?;
    let zst_file = File::create(&zst_path)?;
    zstd::stream::copy_encode(tar_file, zst_file, level)?;

    std::fs::remove_file(&tar_path)?;

    tracing::debug!(
        "Compressed {} -> {}",
        file_path.display(),
        zst_path.display()
    );
    Ok(zst_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test-only inverse of compress_tar_zst.
    fn extract_tar_zst(archive: &Path, dest_dir: &Path) -> io::Result<()> {
        let zst_file = File::open(archive)?;
        let decoder = zstd::stream::Decoder::new(zst_file)?;
        tar::Archive::new(decoder).unpack(dest_dir)
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let source = dir.path().join("episode.mp4");
        std::fs::write(&source, &payload).unwrap();

        let archive = compress_tar_zst(&source, dir.path()).unwrap();
        assert_eq!(archive, dir.path().join("episode.mp4.tar.zst"));
        // Intermediate tar must not survive.
        assert!(!dir.path().join("episode.mp4.tar").exists());

        let out = tempfile::tempdir().unwrap();
        extract_tar_zst(&archive, out.path()).unwrap();
        let restored = std::fs::read(out.path().join("episode.mp4")).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.bin");
        assert!(compress_tar_zst(&missing, dir.path()).is_err());
    }
}
