//! Lookup of compiled contract artifacts.
//!
//! Artifacts are laid out the way Hardhat writes them: one JSON file per
//! contract at `<root>/<source name>/<contract name>.json`, for example
//! `artifacts/contracts/DEX.sol/DEX.json`. A contract can be requested either
//! by its bare name (`DEX`) or by its fully qualified name
//! (`contracts/DEX.sol:DEX`); the latter is required when several sources
//! declare a contract with the same name.

use {
    alloy::{
        json_abi::JsonAbi,
        primitives::{Bytes, hex::FromHexError},
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
    },
};

/// Directory Hardhat stores compiler inputs and outputs in. It never contains
/// contract artifacts.
const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("artifact for contract {name:?} not found in {}", root.display())]
    NotFound { name: String, root: PathBuf },
    #[error(
        "multiple artifacts for contract {name:?}, use one of the fully qualified names: {}",
        candidates.join(", ")
    )]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("contract {0:?} is abstract and can't be deployed")]
    Abstract(String),
    #[error("contract {name:?} must be linked against libraries: {}", libraries.join(", "))]
    Unlinked {
        name: String,
        libraries: Vec<String>,
    },
    #[error(
        "constructor of contract {name:?} expects {expected} argument(s) but none are provided"
    )]
    ConstructorArguments { name: String, expected: usize },
    #[error("malformed bytecode in artifact {}", path.display())]
    Bytecode {
        path: PathBuf,
        #[source]
        source: FromHexError,
    },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Library placeholders by source file and library name. The offsets are not
/// needed since unlinked bytecode is rejected anyway.
type LinkReferences = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    // Kept as a string because unlinked bytecode contains `__$...$__`
    // placeholders which are not valid hex.
    bytecode: String,
    #[serde(default)]
    link_references: LinkReferences,
}

/// A compiled contract ready to be turned into a creation transaction.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    /// Creation (init) code.
    pub bytecode: Bytes,
    /// File the artifact was read from.
    pub path: PathBuf,
}

impl Artifact {
    /// Reads and validates a single artifact file.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawArtifact = serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_owned(),
            source,
        })?;

        if !raw.link_references.is_empty() {
            let libraries = raw
                .link_references
                .iter()
                .flat_map(|(source, libraries)| {
                    libraries.keys().map(move |library| format!("{source}:{library}"))
                })
                .collect();
            return Err(Error::Unlinked {
                name: raw.contract_name,
                libraries,
            });
        }

        let bytecode = raw.bytecode.parse().map_err(|source| Error::Bytecode {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path: path.to_owned(),
        })
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Checks that the contract can be deployed without constructor
    /// arguments.
    pub fn ensure_deployable(&self) -> Result<(), Error> {
        if self.bytecode.is_empty() {
            return Err(Error::Abstract(self.contract_name.clone()));
        }
        let expected = self
            .abi
            .constructor
            .as_ref()
            .map(|constructor| constructor.inputs.len())
            .unwrap_or_default();
        if expected > 0 {
            return Err(Error::ConstructorArguments {
                name: self.contract_name.clone(),
                expected,
            });
        }
        Ok(())
    }
}

/// The directory compiled artifacts are looked up in.
#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact for a bare or fully qualified contract name.
    pub fn find(&self, name: &str) -> Result<Artifact, Error> {
        let not_found = || Error::NotFound {
            name: name.to_owned(),
            root: self.root.clone(),
        };

        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self.root.join(source).join(format!("{contract}.json"));
            if !path.is_file() {
                return Err(not_found());
            }
            return Artifact::read(&path);
        }

        if !self.root.is_dir() {
            return Err(not_found());
        }
        let mut matches = Vec::new();
        collect(&self.root, &format!("{name}.json"), &mut matches)?;
        matches.sort();

        match matches.as_slice() {
            [] => Err(not_found()),
            [path] => Artifact::read(path),
            paths => Err(Error::Ambiguous {
                name: name.to_owned(),
                candidates: paths
                    .iter()
                    .map(|path| self.fully_qualified_name(path, name))
                    .collect(),
            }),
        }
    }

    /// Derives `<source name>:<contract>` from the artifact location without
    /// reading the file.
    fn fully_qualified_name(&self, path: &Path, contract: &str) -> String {
        let source = path
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.root).ok())
            .unwrap_or(Path::new(""));
        let source = source
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{source}:{contract}")
    }
}

fn collect(dir: &Path, file_name: &str, matches: &mut Vec<PathBuf>) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: dir.to_owned(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                continue;
            }
            collect(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|name| name == file_name) {
            matches.push(path);
        }
    }
    Ok(())
}
