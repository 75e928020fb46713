//! On-disk state
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the
//! target, so an interrupted run leaves either the old or the new file.

use crate::config::Paths;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::Identifier;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads and writes every file named in [`Paths`]
#[derive(Debug, Clone)]
pub struct Store {
    paths: Paths,
}

impl Store {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Source URLs; blank lines and `#` comments are skipped
    pub async fn sources(&self) -> Result<Vec<String>> {
        let contents = read_optional(&self.paths.sources).await?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    /// Stopword patterns; only blank lines are skipped
    pub async fn stopwords(&self) -> Result<Vec<String>> {
        let contents = read_optional(&self.paths.stopwords).await?;
        Ok(contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Dataset; a missing file is an empty dataset
    pub async fn dataset(&self) -> Result<Dataset> {
        let path = &self.paths.dataset;
        let contents = read_optional(path).await?;
        if contents.trim().is_empty() {
            return Ok(Dataset::new());
        }
        Dataset::from_json(&contents).map_err(|source| Error::Dataset {
            path: path.clone(),
            source,
        })
    }

    pub async fn save_dataset(&self, dataset: &Dataset) -> Result<()> {
        let path = &self.paths.dataset;
        let json = dataset.to_json().map_err(|source| Error::Dataset {
            path: path.clone(),
            source,
        })?;
        write_atomic(path, &json).await
    }

    /// Past selections, oldest first
    pub async fn history(&self) -> Result<Vec<Identifier>> {
        let contents = read_optional(&self.paths.history).await?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Identifier::from)
            .collect())
    }

    pub async fn save_history(&self, history: &[Identifier]) -> Result<()> {
        write_atomic(&self.paths.history, &history_contents(history)).await
    }

    /// Current selection, if any
    pub async fn next(&self) -> Result<Option<Identifier>> {
        let contents = read_optional(&self.paths.next).await?;
        let id = contents.trim();
        Ok((!id.is_empty()).then(|| Identifier::new(id)))
    }

    pub async fn save_next(&self, id: &Identifier) -> Result<()> {
        write_atomic(&self.paths.next, &format!("{id}\n")).await
    }

    /// Write the description, the next selection and, if given, the history
    /// as one unit
    ///
    /// All three files are staged before any is renamed into place, so a
    /// failed write leaves every file as it was. Only a rename failing
    /// part-way can still leave them out of step.
    pub async fn save_selection(
        &self,
        description: &str,
        next: &Identifier,
        history: Option<&[Identifier]>,
    ) -> Result<()> {
        let mut files = Vec::with_capacity(3);
        if let Some(history) = history {
            files.push((self.paths.history.as_path(), history_contents(history)));
        }
        files.push((self.paths.next.as_path(), format!("{next}\n")));
        files.push((self.paths.description.as_path(), description.to_string()));

        let mut staged = Vec::with_capacity(files.len());
        for (path, contents) in &files {
            match stage(path, contents).await {
                Ok(tmp) => staged.push((tmp, *path)),
                Err(e) => {
                    for (tmp, _) in &staged {
                        let _ = tokio::fs::remove_file(tmp).await;
                    }
                    return Err(e);
                }
            }
        }
        for (tmp, path) in &staged {
            commit(tmp, path).await?;
        }
        Ok(())
    }

    pub async fn description(&self) -> Result<String> {
        read_required(&self.paths.description).await
    }

    pub async fn page(&self) -> Result<String> {
        read_required(&self.paths.page).await
    }

    pub async fn save_page(&self, page: &str) -> Result<()> {
        write_atomic(&self.paths.page, page).await
    }
}

async fn read_required(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))
}

/// File contents, or an empty string if the file does not exist
async fn read_optional(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Missing file treated as empty");
            Ok(String::new())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn history_contents(history: &[Identifier]) -> String {
    let mut contents = String::new();
    for id in history {
        contents.push_str(id.as_str());
        contents.push('\n');
    }
    contents
}

/// Write `contents` to the temporary sibling of `path`
async fn stage(path: &Path, contents: &str) -> Result<PathBuf> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| Error::io(&tmp, e))?;
    Ok(tmp)
}

async fn commit(tmp: &Path, path: &Path) -> Result<()> {
    tokio::fs::rename(tmp, path)
        .await
        .map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Write through a temporary sibling and rename it into place
pub async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = stage(path, contents).await?;
    commit(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::MetadataRecord;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(Config::for_dir(dir.path()).paths);
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let (_dir, store) = store();
        assert!(store.sources().await.unwrap().is_empty());
        assert!(store.stopwords().await.unwrap().is_empty());
        assert!(store.dataset().await.unwrap().is_empty());
        assert!(store.history().await.unwrap().is_empty());
        assert!(store.next().await.unwrap().is_none());
        assert!(matches!(store.page().await, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn test_line_lists() {
        let (_dir, store) = store();
        std::fs::write(
            &store.paths().sources,
            "# conferences\nhttps://a.example.org/\n\n  https://b.example.org/  \n",
        )
        .unwrap();
        std::fs::write(&store.paths().stopwords, "workshop\n\n#\\d+ poster\n").unwrap();

        assert_eq!(
            store.sources().await.unwrap(),
            vec!["https://a.example.org/", "https://b.example.org/"]
        );
        assert_eq!(
            store.stopwords().await.unwrap(),
            vec!["workshop", "#\\d+ poster"]
        );
    }

    #[tokio::test]
    async fn test_dataset_round_trip_is_stable() {
        let (_dir, store) = store();
        let mut dataset = Dataset::new();
        dataset.insert(
            Identifier::new("https://doi.org/10.1000/a"),
            MetadataRecord::new("A."),
        );

        store.save_dataset(&dataset).await.unwrap();
        let first = std::fs::read(&store.paths().dataset).unwrap();
        let loaded = store.dataset().await.unwrap();
        store.save_dataset(&loaded).await.unwrap();

        assert_eq!(loaded, dataset);
        assert_eq!(std::fs::read(&store.paths().dataset).unwrap(), first);
        assert!(!temp_path(&store.paths().dataset).exists());
    }

    #[tokio::test]
    async fn test_corrupt_dataset() {
        let (_dir, store) = store();
        std::fs::write(&store.paths().dataset, "{ not json").unwrap();
        assert!(matches!(store.dataset().await, Err(Error::Dataset { .. })));
    }

    #[tokio::test]
    async fn test_history_and_next() {
        let (_dir, store) = store();
        let history = vec![
            Identifier::new("https://doi.org/10.1000/a"),
            Identifier::new("https://doi.org/10.1000/b"),
        ];
        store.save_history(&history).await.unwrap();
        store.save_next(&history[1]).await.unwrap();

        assert_eq!(store.history().await.unwrap(), history);
        assert_eq!(store.next().await.unwrap(), Some(history[1].clone()));
        assert_eq!(
            std::fs::read_to_string(&store.paths().history).unwrap(),
            "https://doi.org/10.1000/a\nhttps://doi.org/10.1000/b\n"
        );
    }

    #[tokio::test]
    async fn test_save_selection() {
        let (_dir, store) = store();
        let a = Identifier::new("https://doi.org/10.1000/a");

        store
            .save_selection("T\nC\nA", &a, Some(&[a.clone()][..]))
            .await
            .unwrap();

        assert_eq!(store.description().await.unwrap(), "T\nC\nA");
        assert_eq!(store.next().await.unwrap(), Some(a.clone()));
        assert_eq!(store.history().await.unwrap(), vec![a.clone()]);

        // Without a history the history file is left alone
        store.save_history(&[]).await.unwrap();
        store.save_selection("T2\nC\nA", &a, None).await.unwrap();
        assert!(store.history().await.unwrap().is_empty());
        assert_eq!(store.description().await.unwrap(), "T2\nC\nA");
    }

    #[tokio::test]
    async fn test_save_selection_failure_writes_nothing() {
        let (_dir, store) = store();
        let a = Identifier::new("https://doi.org/10.1000/a");
        // A directory where the staged description would go makes staging fail
        std::fs::create_dir(temp_path(&store.paths().description)).unwrap();

        let result = store.save_selection("T\nC\nA", &a, Some(&[a.clone()][..])).await;

        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(!store.paths().next.exists());
        assert!(!store.paths().history.exists());
        assert!(!store.paths().description.exists());
        assert!(!temp_path(&store.paths().next).exists());
        assert!(!temp_path(&store.paths().history).exists());
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/srv/club/dataset.json")),
            PathBuf::from("/srv/club/dataset.json.tmp")
        );
    }
}
