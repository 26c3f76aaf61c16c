use crate::error::{DotnetWasmError, Result};
use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// A .NET project file split into the pieces the toolchain commands need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    /// Path as given by the user
    pub path: PathBuf,
    /// Absolute directory containing the project file
    pub directory: PathBuf,
    /// Bare file name, e.g. `App.csproj`
    pub file_name: String,
}

impl ProjectReference {
    /// Resolve against the process working directory
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_path(path, &cwd)
    }

    /// Resolve `path` against `cwd`; the project file must exist
    pub fn from_path(path: impl Into<PathBuf>, cwd: &Path) -> Result<Self> {
        let project = Self::split(path, cwd)?;
        if !project.absolute_path().is_file() {
            return Err(DotnetWasmError::invalid_project(project.absolute_path()));
        }
        Ok(project)
    }

    /// Split without touching the filesystem
    pub(crate) fn split(path: impl Into<PathBuf>, cwd: &Path) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| DotnetWasmError::invalid_project(&path))?;

        let absolute = if path.is_absolute() {
            path.clone()
        } else {
            cwd.join(&path)
        }
        .clean();

        let directory = absolute
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| DotnetWasmError::invalid_project(&path))?;

        Ok(Self {
            path,
            directory,
            file_name,
        })
    }

    /// Absolute path to the project file
    pub fn absolute_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn splits_relative_project_path() {
        let project = ProjectReference::split("../app/App.csproj", Path::new("/work/web")).unwrap();
        assert_eq!(project.file_name, "App.csproj");
        assert_eq!(project.directory, PathBuf::from("/work/app"));
        assert_eq!(
            project.absolute_path(),
            PathBuf::from("/work/app/App.csproj")
        );
    }

    #[test]
    fn keeps_absolute_project_path() {
        let project =
            ProjectReference::split("/src/App/App.fsproj", Path::new("/elsewhere")).unwrap();
        assert_eq!(project.directory, PathBuf::from("/src/App"));
        assert_eq!(project.path, PathBuf::from("/src/App/App.fsproj"));
    }

    #[test]
    fn rejects_path_without_file_name() {
        let err = ProjectReference::from_path("..", Path::new("/work")).unwrap_err();
        assert!(matches!(err, DotnetWasmError::InvalidProject { .. }));
    }

    #[test]
    fn rejects_missing_project_file() {
        let temp = TempDir::new().unwrap();
        let err = ProjectReference::from_path("App/App.csproj", temp.path()).unwrap_err();
        match err {
            DotnetWasmError::InvalidProject { path } => {
                assert_eq!(path, temp.path().join("App/App.csproj"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_directory_as_project() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("App.csproj")).unwrap();
        let err = ProjectReference::from_path("App.csproj", temp.path()).unwrap_err();
        assert!(matches!(err, DotnetWasmError::InvalidProject { .. }));
    }

    #[test]
    fn accepts_existing_project_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("App")).unwrap();
        fs::write(temp.path().join("App/App.csproj"), "<Project />").unwrap();
        let project = ProjectReference::from_path("App/App.csproj", temp.path()).unwrap();
        assert_eq!(project.directory, temp.path().join("App"));
        assert_eq!(project.file_name, "App.csproj");
    }

    #[test]
    fn context_rejects_missing_project() {
        let err = crate::DotnetWasmContext::new(crate::DotnetWasmOptions::new(
            "/definitely/not/here/App.csproj",
        ))
        .unwrap_err();
        assert!(matches!(err, DotnetWasmError::InvalidProject { .. }));
    }
}
