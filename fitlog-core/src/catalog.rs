//! Read-only exercise catalog: a JSON reference file mapping exercise
//! names to primary muscles. Loaded lazily, cached in-process, and
//! reloadable on demand. There is no process-wide catalog state; callers
//! hold the instance they construct.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::info;
use serde::Deserialize;

use crate::error::{Error, Result};

/// English catalog muscle → display name in the app locale.
const MUSCLE_PT: &[(&str, &str)] = &[
    ("abdominais", "Abdômen"),
    ("abductors", "Abdutores"),
    ("adductors", "Adutores"),
    ("biceps", "Bíceps"),
    ("calves", "Panturrilhas"),
    ("chest", "Peitoral"),
    ("forearms", "Antebraços"),
    ("glutes", "Glúteos"),
    ("hamstrings", "Posterior de Coxa"),
    ("lats", "Dorsal"),
    ("lower back", "Lombar"),
    ("middle back", "Costas"),
    ("neck", "Pescoço"),
    ("quadriceps", "Quadríceps"),
    ("shoulders", "Ombros"),
    ("traps", "Trapézio"),
    ("triceps", "Tríceps"),
];

fn translate_muscle(name: &str) -> String {
    let lower = name.to_lowercase();
    MUSCLE_PT
        .iter()
        .find(|(en, _)| *en == lower)
        .map(|(_, pt)| (*pt).to_string())
        .unwrap_or_else(|| title_case(name))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips the accented characters that occur in the catalog's locale.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

fn normalize(text: &str) -> String {
    strip_accents(&text.to_lowercase()).trim().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, rename = "primaryMuscles")]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// A catalog match, referenced by name. Catalog entries carry no
/// surrogate ids.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHit {
    pub nome: String,
    pub musculo: String,
    pub equipment: Option<String>,
}

pub struct ExerciseCatalog {
    path: PathBuf,
    cache: RwLock<Option<Arc<Vec<CatalogEntry>>>>,
}

impl ExerciseCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        ExerciseCatalog {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(None),
        }
    }

    fn load(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        let raw = std::fs::read_to_string(&self.path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        info!(
            "Catalog loaded with {} exercises from {}",
            entries.len(),
            self.path.display()
        );
        Ok(Arc::new(entries))
    }

    fn lock_poisoned() -> Error {
        Error::Io(std::io::Error::other("catalog cache lock poisoned"))
    }

    /// The cached entries, loading the file on first use.
    pub fn entries(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        {
            let cache = self.cache.read().map_err(|_| Self::lock_poisoned())?;
            if let Some(entries) = cache.as_ref() {
                return Ok(entries.clone());
            }
        }
        let entries = self.load()?;
        let mut cache = self.cache.write().map_err(|_| Self::lock_poisoned())?;
        *cache = Some(entries.clone());
        Ok(entries)
    }

    /// Drops the cache and reads the file again. Returns the entry count.
    pub fn reload(&self) -> Result<usize> {
        let entries = self.load()?;
        let count = entries.len();
        let mut cache = self.cache.write().map_err(|_| Self::lock_poisoned())?;
        *cache = Some(entries);
        Ok(count)
    }

    /// Primary muscle for an exercise name, translated to the app
    /// locale. Exact match first, then substring containment in either
    /// direction; first match wins.
    pub fn find_primary_muscle(&self, nome: &str) -> Result<Option<String>> {
        let entries = self.entries()?;
        let busca = normalize(nome);
        if busca.is_empty() {
            return Ok(None);
        }

        let primary = |entry: &CatalogEntry| {
            entry
                .primary_muscles
                .first()
                .map(|muscle| translate_muscle(muscle))
        };

        for entry in entries.iter() {
            if normalize(&entry.name) == busca {
                return Ok(primary(entry));
            }
        }
        for entry in entries.iter() {
            if normalize(&entry.name).contains(&busca) {
                return Ok(primary(entry));
            }
        }
        for entry in entries.iter() {
            if busca.contains(&normalize(&entry.name)) {
                return Ok(primary(entry));
            }
        }
        Ok(None)
    }

    /// Catalog entries matching a name term and/or muscle display name.
    pub fn search(
        &self,
        termo: Option<&str>,
        musculo: Option<&str>,
        limite: usize,
    ) -> Result<Vec<CatalogHit>> {
        let entries = self.entries()?;
        let termo = termo.map(normalize);

        let mut hits = Vec::new();
        for entry in entries.iter() {
            let muscle_display = entry
                .primary_muscles
                .first()
                .map(|m| translate_muscle(m))
                .unwrap_or_else(|| "Não especificado".to_string());

            if let Some(termo) = &termo {
                if !normalize(&entry.name).contains(termo.as_str()) {
                    continue;
                }
            }
            if let Some(musculo) = musculo {
                if muscle_display != musculo {
                    continue;
                }
            }

            hits.push(CatalogHit {
                nome: entry.name.clone(),
                musculo: muscle_display,
                equipment: entry.equipment.clone(),
            });
            if hits.len() >= limite {
                break;
            }
        }
        hits.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(hits)
    }

    /// The distinct muscle display names present in the catalog, sorted.
    pub fn muscles(&self) -> Result<Vec<String>> {
        let entries = self.entries()?;
        let mut muscles: Vec<String> = entries
            .iter()
            .filter_map(|entry| entry.primary_muscles.first())
            .map(|m| translate_muscle(m))
            .collect();
        muscles.sort();
        muscles.dedup();
        Ok(muscles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Barbell Bench Press", "primaryMuscles": ["chest"], "equipment": "barbell"}},
                {{"name": "Lat Pulldown", "primaryMuscles": ["lats"]}},
                {{"name": "Agachamento Búlgaro", "primaryMuscles": ["quadriceps"]}},
                {{"name": "Obscure Move", "primaryMuscles": ["zygomatic"]}}
            ]"#
        )
        .unwrap();
        file
    }

    #[test]
    fn exact_match_translated() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        assert_eq!(
            catalog.find_primary_muscle("barbell bench press").unwrap(),
            Some("Peitoral".to_string())
        );
    }

    #[test]
    fn accent_insensitive_match() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        assert_eq!(
            catalog.find_primary_muscle("agachamento bulgaro").unwrap(),
            Some("Quadríceps".to_string())
        );
    }

    #[test]
    fn substring_either_direction() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        // Search term contained in a catalog name.
        assert_eq!(
            catalog.find_primary_muscle("Pulldown").unwrap(),
            Some("Dorsal".to_string())
        );
        // Catalog name contained in the search term.
        assert_eq!(
            catalog
                .find_primary_muscle("Lat Pulldown na polia alta")
                .unwrap(),
            Some("Dorsal".to_string())
        );
    }

    #[test]
    fn unknown_name_yields_none() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        assert_eq!(catalog.find_primary_muscle("Xyz").unwrap(), None);
    }

    #[test]
    fn untranslated_muscle_is_title_cased() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        assert_eq!(
            catalog.find_primary_muscle("Obscure Move").unwrap(),
            Some("Zygomatic".to_string())
        );
    }

    #[test]
    fn search_filters_by_term_and_muscle() {
        let file = catalog_file();
        let catalog = ExerciseCatalog::new(file.path());
        let hits = catalog.search(Some("press"), None, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].musculo, "Peitoral");

        let hits = catalog.search(None, Some("Dorsal"), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].nome, "Lat Pulldown");
    }

    #[test]
    fn reload_picks_up_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name": "A", "primaryMuscles": ["chest"]}}]"#).unwrap();
        let catalog = ExerciseCatalog::new(file.path());
        assert_eq!(catalog.entries().unwrap().len(), 1);

        file.as_file_mut().set_len(0).unwrap();
        use std::io::Seek;
        file.as_file_mut().rewind().unwrap();
        write!(
            file,
            r#"[{{"name": "A", "primaryMuscles": ["chest"]}}, {{"name": "B", "primaryMuscles": ["lats"]}}]"#
        )
        .unwrap();
        file.as_file_mut().flush().unwrap();

        assert_eq!(catalog.reload().unwrap(), 2);
        assert_eq!(catalog.entries().unwrap().len(), 2);
    }

    #[test]
    fn poisoned_cache_lock_is_an_infrastructure_error() {
        let file = catalog_file();
        let catalog = std::sync::Arc::new(ExerciseCatalog::new(file.path()));
        catalog.entries().unwrap();

        let clone = catalog.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.cache.write().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        let err = catalog.entries().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn strip_accents_table() {
        assert_eq!(strip_accents("Março Bíceps Glúteos ção"), "Marco Biceps Gluteos cao");
    }
}
