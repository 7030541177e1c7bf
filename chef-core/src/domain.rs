use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::alphabet::{Alphabet, Recipe};
use crate::error::Result;
use crate::mime;
use crate::store::FileStore;

#[derive(Clone, Debug, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub mime_type: &'static str,
    pub suggested_recipe: Recipe,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecipeRow {
    pub name: &'static str,
    pub base: u32,
    pub bits_per_symbol: u8,
    pub sample: String,
}

pub fn file_info(store: &dyn FileStore, path: &Path) -> Result<FileInfo> {
    let size = store.size(path)?;
    Ok(FileInfo {
        path: path.to_path_buf(),
        size,
        mime_type: mime::guess(path),
        suggested_recipe: Recipe::suggest(size),
    })
}

/// Every recipe with its first few glyphs.
pub fn recipe_book() -> Result<Vec<RecipeRow>> {
    Recipe::ALL
        .iter()
        .map(|&r| {
            let alphabet = Alphabet::new(r);
            let sample = alphabet.render(&[0, 1, 2, 3, 4])?;
            Ok(RecipeRow {
                name: r.name(),
                base: r.base(),
                bits_per_symbol: r.bits_per_symbol(),
                sample,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_fs::FsStore;

    #[test]
    fn info_for_small_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("menu.txt");
        std::fs::write(&p, b"soup").unwrap();
        let info = file_info(&FsStore, &p).unwrap();
        assert_eq!(info.size, 4);
        assert_eq!(info.mime_type, "text/plain");
        assert_eq!(info.suggested_recipe, Recipe::Quick);
    }

    #[test]
    fn book_lists_all_recipes() {
        let book = recipe_book().unwrap();
        assert_eq!(book.len(), 4);
        assert_eq!(book[2].name, "classic");
        assert_eq!(book[2].sample.chars().next(), Some('\u{1F600}'));
    }
}
