//! Turning an `.fmu` archive into a working directory, a model descriptor and a loaded library.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use fmi_schema::{
    fmi1::Fmi1ModelDescription,
    minimal::MinModelDescription,
    traits::FmiModelDescription,
    MajorVersion,
};

use crate::{binding::Binding, descriptor::ModelDescriptor, library::Library, Error};

const MODEL_DESCRIPTION: &str = "modelDescription.xml";

/// The collaborators a [`crate::ModelUnit`] needs to get from an archive to a callable unit.
pub trait Importer {
    /// The function table produced by [`Importer::load`]
    type Binding: Binding;

    /// Extract the archive into a fresh directory that is removed when the handle is dropped.
    fn extract(&self, archive: &Path) -> Result<tempfile::TempDir, Error>;

    /// Parse the model description found in the extracted directory.
    fn parse(&self, dir: &Path) -> Result<ModelDescriptor, Error>;

    /// Load the shared library for `model_identifier`, resolving every entry point.
    fn load(&self, dir: &Path, model_identifier: &str) -> Result<Self::Binding, Error>;
}

/// Imports FMI 1.0 Co-Simulation FMUs from disk.
#[derive(Debug, Clone, Default)]
pub struct FmuImporter {
    /// Parent directory for extraction; the system temp dir if `None`
    temp_dir: Option<PathBuf>,
}

impl FmuImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract into a directory created below `temp_dir`
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(temp_dir.into()),
        }
    }

    /// Read and check the full FMI 1.0 model description in `dir`.
    pub fn read_model_description(&self, dir: &Path) -> Result<Fmi1ModelDescription, Error> {
        let descr_path = dir.join(MODEL_DESCRIPTION);
        let descr_xml = std::fs::read_to_string(&descr_path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::MissingModelDescription(descr_path),
            _ => Error::Io(err),
        })?;

        // Initial non-version-specific model description
        let minimal: MinModelDescription = descr_xml.parse()?;
        log::debug!(
            "Found FMI {} named '{}'",
            minimal.fmi_version,
            minimal.model_name
        );
        if minimal.major_version()? != MajorVersion::FMI1 {
            return Err(Error::UnsupportedFmiVersion(minimal.fmi_version));
        }

        let md: Fmi1ModelDescription = descr_xml.parse()?;
        if !md.is_co_simulation() {
            return Err(Error::UnsupportedFmuType("ModelExchange".to_owned()));
        }
        Ok(md)
    }
}

impl Importer for FmuImporter {
    type Binding = Library;

    fn extract(&self, archive: &Path) -> Result<tempfile::TempDir, Error> {
        let extraction_failed = |source: zip::result::ZipError| Error::ExtractionFailed {
            path: archive.to_owned(),
            source,
        };

        log::debug!("Opening FMU file {archive:?}");
        let file = File::open(archive).map_err(|e| extraction_failed(e.into()))?;
        let mut zip = zip::ZipArchive::new(file).map_err(extraction_failed)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("fmi-cosim");
        let temp_dir = match &self.temp_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| extraction_failed(e.into()))?;

        log::debug!("Extracting into {temp_dir:?}");
        zip.extract(&temp_dir).map_err(extraction_failed)?;

        for fname in zip.file_names() {
            log::trace!("  - {}", fname);
        }
        Ok(temp_dir)
    }

    fn parse(&self, dir: &Path) -> Result<ModelDescriptor, Error> {
        self.read_model_description(dir)
            .map(|md| ModelDescriptor::from(&md))
    }

    fn load(&self, dir: &Path, model_identifier: &str) -> Result<Library, Error> {
        let lib_path = dir.join(shared_lib_path(model_identifier)?);
        Library::load(&lib_path, model_identifier)
    }
}

/// Path of the shared library relative to the root of the extracted FMU.
pub fn shared_lib_path(model_identifier: &str) -> Result<PathBuf, Error> {
    let platform_folder = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") => "win64",
        ("windows", "x86") => "win32",
        ("linux", "x86_64") => "linux64",
        ("linux", "x86") => "linux32",
        ("macos", "x86_64" | "aarch64") => "darwin64",
        ("macos", "x86") => "darwin32",
        _ => {
            return Err(Error::UnsupportedPlatform {
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
            });
        }
    };
    let fname = format!("{model_identifier}{}", std::env::consts::DLL_SUFFIX);
    Ok(PathBuf::from("binaries").join(platform_folder).join(fname))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FMI1_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fmiModelDescription fmiVersion="1.0" modelName="inc" modelIdentifier="inc" guid="{inc-guid}">
  <DefaultExperiment startTime="0" stopTime="2"/>
  <ModelVariables>
    <ScalarVariable name="counter" valueReference="0" causality="output"><Integer start="1"/></ScalarVariable>
  </ModelVariables>
  <Implementation><CoSimulation_StandAlone><Capabilities canHandleVariableCommunicationStepSize="true"/></CoSimulation_StandAlone></Implementation>
</fmiModelDescription>"#;

    fn write_fmu(dir: &Path, xml: &str) -> PathBuf {
        let path = dir.join("model.fmu");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(MODEL_DESCRIPTION, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_shared_lib_path() {
        if let Ok(path) = shared_lib_path("bouncingBall") {
            assert!(path.starts_with("binaries"));
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("bouncingBall{}", std::env::consts::DLL_SUFFIX)
            );
        }
    }

    #[test]
    fn test_extract_and_parse() {
        let scratch = tempfile::tempdir().unwrap();
        let fmu = write_fmu(scratch.path(), FMI1_XML);

        let importer = FmuImporter::with_temp_dir(scratch.path());
        let dir = importer.extract(&fmu).unwrap();
        assert!(dir.path().starts_with(scratch.path()));
        assert!(dir.path().join(MODEL_DESCRIPTION).exists());

        let descriptor = importer.parse(dir.path()).unwrap();
        assert_eq!(descriptor.model_identifier, "inc");
        assert_eq!(descriptor.guid, "{inc-guid}");
        assert_eq!(descriptor.variables[0].name, "counter");

        // No binaries in the archive
        assert!(matches!(
            importer.load(dir.path(), "inc"),
            Err(Error::LoadFailed { .. }) | Err(Error::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn test_rejects_other_versions() {
        let scratch = tempfile::tempdir().unwrap();
        let xml = r#"<fmiModelDescription fmiVersion="2.0" modelName="m" guid="{0}"/>"#;
        std::fs::write(scratch.path().join(MODEL_DESCRIPTION), xml).unwrap();

        let importer = FmuImporter::new();
        assert!(matches!(
            importer.parse(scratch.path()),
            Err(Error::UnsupportedFmiVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_rejects_model_exchange() {
        let scratch = tempfile::tempdir().unwrap();
        let xml = r#"<fmiModelDescription fmiVersion="1.0" modelName="m" modelIdentifier="m" guid="{0}"/>"#;
        std::fs::write(scratch.path().join(MODEL_DESCRIPTION), xml).unwrap();

        assert!(matches!(
            FmuImporter::new().parse(scratch.path()),
            Err(Error::UnsupportedFmuType(_))
        ));
    }

    #[test]
    fn test_missing_temp_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let fmu = write_fmu(scratch.path(), FMI1_XML);

        let importer = FmuImporter::with_temp_dir(scratch.path().join("nonexistent"));
        assert!(matches!(
            importer.extract(&fmu),
            Err(Error::ExtractionFailed {
                source: zip::result::ZipError::Io(_),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_model_description() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().join("empty.fmu");
        zip::ZipWriter::new(File::create(&path).unwrap())
            .finish()
            .unwrap();

        let importer = FmuImporter::new();
        let dir = importer.extract(&path).unwrap();
        assert!(matches!(
            importer.parse(dir.path()),
            Err(Error::MissingModelDescription(p)) if p == dir.path().join(MODEL_DESCRIPTION)
        ));
    }

    #[test]
    fn test_extraction_failures() {
        let scratch = tempfile::tempdir().unwrap();
        let importer = FmuImporter::new();

        assert!(matches!(
            importer.extract(&scratch.path().join("missing.fmu")),
            Err(Error::ExtractionFailed { .. })
        ));

        let not_a_zip = scratch.path().join("garbage.fmu");
        std::fs::write(&not_a_zip, b"not a zip archive").unwrap();
        assert!(matches!(
            importer.extract(&not_a_zip),
            Err(Error::ExtractionFailed { .. })
        ));
    }
}
