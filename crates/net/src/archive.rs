//! Archive unpacking for tar, gzip-compressed tar and zip sources

use artifetch_errors::{Error, FetchError};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// Container formats the transports unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArchiveFormat {
    Tar,
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Whether a file name looks like a supported archive
#[must_use]
pub(crate) fn is_archive(name: &str) -> bool {
    ArchiveFormat::from_name(name).is_some()
}

/// Unpack `archive` into `dest`, keeping only `subdir` when given
///
/// `name` is the archive's file name and selects the format;
/// `source` is only used for error messages.
pub(crate) async fn unpack(
    archive: &Path,
    name: &str,
    dest: &Path,
    subdir: Option<&str>,
    source: &str,
) -> Result<(), Error> {
    let Some(format) = ArchiveFormat::from_name(name) else {
        return Err(FetchError::ArchiveFailed {
            source_str: source.to_string(),
            message: format!("unsupported archive {name}"),
        }
        .into());
    };
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let subdir = subdir.map(PathBuf::from);
    let source = source.to_string();

    tokio::task::spawn_blocking(move || {
        let unpacker = Unpacker {
            dest: &dest,
            subdir: subdir.as_deref(),
            source: &source,
        };
        unpacker.run(&archive, format)
    })
    .await
    .map_err(|e| Error::internal(format!("extract task failed: {e}")))?
}

/// Blocking extraction state shared by the tar and zip readers
struct Unpacker<'a> {
    dest: &'a Path,
    subdir: Option<&'a Path>,
    source: &'a str,
}

impl Unpacker<'_> {
    fn run(&self, archive_path: &Path, format: ArchiveFormat) -> Result<(), Error> {
        let file = File::open(archive_path).map_err(|e| Error::io_with_path(&e, archive_path))?;
        std::fs::create_dir_all(self.dest).map_err(|e| Error::io_with_path(&e, self.dest))?;

        let matched = match format {
            ArchiveFormat::Tar => self.unpack_tar(Box::new(file))?,
            ArchiveFormat::TarGz => self.unpack_tar(Box::new(GzDecoder::new(file)))?,
            ArchiveFormat::Zip => self.unpack_zip(file)?,
        };

        if !matched {
            if let Some(subdir) = self.subdir {
                return Err(FetchError::SubdirNotFound {
                    source_str: self.source.to_string(),
                    subdir: subdir.display().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn error(&self, message: impl std::fmt::Display) -> Error {
        FetchError::ArchiveFailed {
            source_str: self.source.to_string(),
            message: message.to_string(),
        }
        .into()
    }

    /// Where an entry lands, `None` when it falls outside the subdir
    ///
    /// The subdir's own directory entry maps onto `dest` itself.
    fn target(&self, path: &Path) -> Result<Option<PathBuf>, Error> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(self.error(format!("entry {} escapes the destination", path.display())));
        }

        let relative = normalized(path);
        let rest = match self.subdir {
            None => relative.as_path(),
            Some(subdir) => match relative.strip_prefix(subdir) {
                Ok(rest) => rest,
                Err(_) => return Ok(None),
            },
        };
        Ok(Some(self.dest.join(rest)))
    }

    fn unpack_tar(&self, reader: Box<dyn Read>) -> Result<bool, Error> {
        let mut archive = Archive::new(reader);
        archive.set_preserve_permissions(true);
        archive.set_unpack_xattrs(false);

        let mut matched = false;
        for entry in archive.entries().map_err(|e| self.error(e))? {
            let mut entry = entry.map_err(|e| self.error(e))?;
            let path = entry.path().map_err(|e| self.error(e))?.into_owned();

            let Some(target) = self.target(&path)? else {
                continue;
            };
            matched = true;

            if self.subdir.is_none() {
                entry.unpack_in(self.dest).map_err(|e| self.error(e))?;
                continue;
            }
            if target == self.dest {
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
            }
            entry.unpack(&target).map_err(|e| self.error(e))?;
        }
        Ok(matched)
    }

    fn unpack_zip(&self, file: File) -> Result<bool, Error> {
        let mut archive = zip::ZipArchive::new(file).map_err(|e| self.error(e))?;

        let mut matched = false;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| self.error(e))?;
            let Some(path) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
                return Err(self.error(format!(
                    "entry {} escapes the destination",
                    entry.name()
                )));
            };

            let Some(target) = self.target(&path)? else {
                continue;
            };
            matched = true;

            if entry.is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| Error::io_with_path(&e, &target))?;
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
            }
            let mut out = File::create(&target).map_err(|e| Error::io_with_path(&e, &target))?;
            std::io::copy(&mut entry, &mut out).map_err(|e| self.error(e))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    let permissions = std::fs::Permissions::from_mode(mode & 0o777);
                    std::fs::set_permissions(&target, permissions)
                        .map_err(|e| Error::io_with_path(&e, &target))?;
                }
            }
        }
        Ok(matched)
    }
}

/// Drop `.` components so `./a/b` matches a subdir of `a`
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn build_tar_gz(path: &Path, files: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn build_zip(path: &Path, files: &[(&str, &str)]) {
        use std::io::Write;

        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
        for (name, content) in files {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive("bundle.tar"));
        assert!(is_archive("bundle.TAR.GZ"));
        assert!(is_archive("bundle.tgz"));
        assert!(is_archive("vsphere.ZIP"));
        assert_eq!(ArchiveFormat::from_name("a.tgz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_name("a.zip"), Some(ArchiveFormat::Zip));
        assert!(!is_archive("README.md"));
    }

    #[tokio::test]
    async fn test_unpack_whole_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.tar.gz");
        build_tar_gz(&archive, &[("a.txt", "a"), ("roles/b.txt", "b")]);

        let dest = temp.path().join("out");
        unpack(&archive, "bundle.tar.gz", &dest, None, "bundle")
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(dest.join("roles/b.txt")).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_unpack_subdir_only() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.tgz");
        build_tar_gz(&archive, &[("a.txt", "a"), ("roles/web/b.txt", "b")]);

        let dest = temp.path().join("out");
        unpack(&archive, "bundle.tgz", &dest, Some("roles"), "bundle")
            .await
            .unwrap();

        assert!(!dest.join("a.txt").exists());
        assert_eq!(std::fs::read_to_string(dest.join("web/b.txt")).unwrap(), "b");
    }

    #[tokio::test]
    async fn test_unpack_missing_subdir() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.tgz");
        build_tar_gz(&archive, &[("a.txt", "a")]);

        let err = unpack(&archive, "bundle.tgz", &temp.path().join("out"), Some("nope"), "bundle")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::SubdirNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unpack_zip_subdir() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("vsphere.zip");
        build_zip(
            &archive,
            &[
                ("furyctl-provisioners-vsphere/", ""),
                ("furyctl-provisioners-vsphere/README.md", "readme"),
                ("furyctl-provisioners-vsphere/roles/", ""),
                ("furyctl-provisioners-vsphere/roles/etcd/tasks/main.yml", "- name: etcd"),
            ],
        );

        let dest = temp.path().join("roles");
        unpack(
            &archive,
            "vsphere.zip",
            &dest,
            Some("furyctl-provisioners-vsphere/roles"),
            "vsphere",
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("etcd/tasks/main.yml")).unwrap(),
            "- name: etcd"
        );
        assert!(!dest.join("README.md").exists());
    }

    #[tokio::test]
    async fn test_unpack_whole_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        build_zip(&archive, &[("a.txt", "a"), ("nested/b.txt", "b")]);

        let dest = temp.path().join("out");
        unpack(&archive, "bundle.zip", &dest, None, "bundle")
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(dest.join("nested/b.txt")).unwrap(), "b");

        let err = unpack(&archive, "bundle.zip", &temp.path().join("x"), Some("missing"), "bundle")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::SubdirNotFound { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_zip_is_archive_failure() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        std::fs::write(&archive, "not a zip").unwrap();

        let err = unpack(&archive, "broken.zip", &temp.path().join("out"), None, "broken")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::ArchiveFailed { .. })));
    }
}
