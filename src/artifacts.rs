use std::path::{Path, PathBuf};

use clap::ValueEnum;
use ethers::abi::Abi;
use ethers::types::Bytes;
use eyre::{bail, eyre, Context};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::forge_utils::ContractSpec;

/// Hardhat keeps full compiler inputs/outputs here, never contract artifacts
const BUILD_INFO_DIR: &str = "build-info";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ArtifactLayout {
    Foundry,
    Hardhat,
}

impl ArtifactLayout {
    pub fn default_dir(self) -> &'static str {
        match self {
            Self::Foundry => "out",
            Self::Hardhat => "artifacts",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: Abi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat
    Hex(String),
    /// Foundry
    Object { object: String },
}

impl ContractArtifact {
    pub fn from_json(name: impl ToString, content: &str) -> eyre::Result<Self> {
        let name = name.to_string();
        let raw: RawArtifact = serde_json::from_str(content)?;

        let bytecode = match raw.bytecode {
            RawBytecode::Hex(s) | RawBytecode::Object { object: s } => s,
        };

        let bytecode = decode_bytecode(&bytecode)
            .with_context(|| format!("Decoding bytecode of {name}"))?;

        if bytecode.is_empty() {
            bail!("{name} has no bytecode, is it abstract or an interface?");
        }

        Ok(Self {
            name,
            abi: raw.abi,
            bytecode,
        })
    }

    /// Data for a contract creation transaction
    pub fn creation_code(&self) -> eyre::Result<Bytes> {
        if let Some(constructor) = self.abi.constructor() {
            if !constructor.inputs.is_empty() {
                bail!(
                    "{} expects {} constructor argument(s), only argument-less constructors can be deployed",
                    self.name,
                    constructor.inputs.len()
                );
            }
        }

        Ok(self.bytecode.clone())
    }
}

fn decode_bytecode(s: &str) -> eyre::Result<Bytes> {
    let s = s.trim_start_matches("0x");

    if s.contains("__") {
        bail!("Bytecode contains unlinked library references");
    }

    Ok(hex::decode(s)?.into())
}

/// Resolves contract names to compiled artifacts stored as
/// `<dir>/<Source>.sol/<Name>.json`
///
/// Foundry keys the source directory by file name only, hardhat by the full
/// source path.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    layout: ArtifactLayout,
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(layout: ArtifactLayout, dir: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            dir: dir.into(),
        }
    }

    #[instrument(skip_all, fields(contract = %spec))]
    pub async fn load(&self, spec: &ContractSpec) -> eyre::Result<ContractArtifact> {
        let path = self.locate(spec).await?;

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Reading from {}", path.display()))?;

        let artifact = ContractArtifact::from_json(&spec.name, &content)
            .with_context(|| format!("Parsing artifact {}", path.display()))?;

        info!("Loaded artifact from {}", path.display());

        Ok(artifact)
    }

    async fn locate(&self, spec: &ContractSpec) -> eyre::Result<PathBuf> {
        let file_name = format!("{}.json", spec.name);

        if let Some(source) = spec.path.as_deref() {
            let source = match self.layout {
                ArtifactLayout::Foundry => source
                    .file_name()
                    .map(Path::new)
                    .ok_or_else(|| eyre!("No source file name in {spec}"))?,
                ArtifactLayout::Hardhat => source,
            };

            let path = self.dir.join(source).join(&file_name);

            if !path.is_file() {
                bail!("Artifact for {spec} not found at {}", path.display());
            }

            return Ok(path);
        }

        let dir = self.dir.clone();
        let candidates = tokio::task::spawn_blocking(move || {
            find_artifacts(&dir, &file_name)
        })
        .await??;

        match candidates.as_slice() {
            [] => bail!(
                "Artifact for {spec} not found in {}",
                self.dir.display()
            ),
            [path] => Ok(path.clone()),
            _ => {
                let candidates = candidates
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                bail!(
                    "Multiple artifacts match {spec}, qualify it with its source path: {candidates}"
                )
            }
        }
    }
}

fn find_artifacts(root: &Path, file_name: &str) -> eyre::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Artifacts directory {} does not exist", root.display());
    }

    let mut found = vec![];
    let mut pending = vec![root.to_owned()];

    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("Reading directory {}", dir.display()))?;

        let in_source_dir = dir.extension().is_some_and(|ext| ext == "sol");

        for entry in entries {
            let entry = entry?;

            if entry.file_type()?.is_dir() {
                if entry.file_name() != BUILD_INFO_DIR {
                    pending.push(entry.path());
                }
                continue;
            }

            if in_source_dir && entry.file_name().to_str() == Some(file_name) {
                found.push(entry.path());
            }
        }
    }

    found.sort();

    Ok(found)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const FOUNDRY_ARTIFACT: &str = indoc! {r#"
        {
          "abi": [
            {
              "type": "constructor",
              "inputs": [],
              "stateMutability": "nonpayable"
            },
            {
              "type": "function",
              "name": "getCreditScore",
              "inputs": [{ "name": "user", "type": "address", "internalType": "address" }],
              "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
              "stateMutability": "view"
            }
          ],
          "bytecode": {
            "object": "0x6080604052348015600f57600080fd5b50",
            "sourceMap": "",
            "linkReferences": {}
          },
          "deployedBytecode": { "object": "0x6080", "sourceMap": "", "linkReferences": {} }
        }
    "#};

    const HARDHAT_ARTIFACT: &str = indoc! {r#"
        {
          "_format": "hh-sol-artifact-1",
          "contractName": "CreditScore",
          "sourceName": "contracts/CreditScore.sol",
          "abi": [],
          "bytecode": "0x6080604052",
          "deployedBytecode": "0x6080",
          "linkReferences": {},
          "deployedLinkReferences": {}
        }
    "#};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn parses_foundry_artifact() {
        let artifact =
            ContractArtifact::from_json("CreditScore", FOUNDRY_ARTIFACT)
                .unwrap();

        assert_eq!(artifact.name, "CreditScore");
        assert!(artifact.abi.function("getCreditScore").is_ok());
        assert_eq!(
            artifact.bytecode.to_vec(),
            hex::decode("6080604052348015600f57600080fd5b50").unwrap()
        );
        assert_eq!(artifact.creation_code().unwrap(), artifact.bytecode);
    }

    #[test]
    fn parses_hardhat_artifact() {
        let artifact =
            ContractArtifact::from_json("CreditScore", HARDHAT_ARTIFACT)
                .unwrap();

        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(artifact.abi.constructor().is_none());
    }

    #[test]
    fn rejects_interfaces() {
        let content = r#"{ "abi": [], "bytecode": { "object": "0x" } }"#;

        let err = ContractArtifact::from_json("ICreditScore", content)
            .unwrap_err();

        assert!(err.to_string().contains("no bytecode"));
    }

    #[test]
    fn rejects_unlinked_bytecode() {
        let content = r#"{
            "abi": [],
            "bytecode": "0x6080__$2f1d9e6bd0bdb2d4f1a0c5b2c8e4f3a1b2$__6040"
        }"#;

        let err =
            ContractArtifact::from_json("CreditScore", content).unwrap_err();

        assert!(format!("{err:?}").contains("unlinked library"));
    }

    #[test]
    fn rejects_constructor_arguments() {
        let content = r#"{
            "abi": [
              {
                "type": "constructor",
                "inputs": [{ "name": "owner", "type": "address", "internalType": "address" }],
                "stateMutability": "nonpayable"
              }
            ],
            "bytecode": "0x6080"
        }"#;

        let artifact =
            ContractArtifact::from_json("CreditScore", content).unwrap();

        let err = artifact.creation_code().unwrap_err();

        assert!(err.to_string().contains("1 constructor argument"));
    }

    #[tokio::test]
    async fn finds_artifact_by_name() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "CreditScore.sol/CreditScore.json", FOUNDRY_ARTIFACT);
        write(dir.path(), "Other.sol/Other.json", FOUNDRY_ARTIFACT);

        let store = ArtifactStore::new(ArtifactLayout::Foundry, dir.path());
        let artifact = store.load(&ContractSpec::name("CreditScore")).await?;

        assert_eq!(artifact.name, "CreditScore");

        Ok(())
    }

    #[tokio::test]
    async fn finds_nested_hardhat_artifact() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "contracts/CreditScore.sol/CreditScore.json",
            HARDHAT_ARTIFACT,
        );
        write(
            dir.path(),
            "contracts/CreditScore.sol/CreditScore.dbg.json",
            r#"{ "_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc.json" }"#,
        );
        write(dir.path(), "build-info/CreditScore.sol/CreditScore.json", "{}");

        let store = ArtifactStore::new(ArtifactLayout::Foundry, dir.path());
        let artifact = store.load(&ContractSpec::name("CreditScore")).await?;

        assert_eq!(artifact.bytecode.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn missing_artifact() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "Other.sol/Other.json", FOUNDRY_ARTIFACT);

        let store = ArtifactStore::new(ArtifactLayout::Foundry, dir.path());
        let err = store
            .load(&ContractSpec::name("CreditScore"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not found"));

        Ok(())
    }

    #[tokio::test]
    async fn missing_artifacts_dir() {
        let store = ArtifactStore::new(
            ArtifactLayout::Foundry,
            "/definitely/not/a/real/out",
        );

        let err = store
            .load(&ContractSpec::name("CreditScore"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn ambiguous_name_needs_a_path() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "CreditScore.sol/CreditScore.json", FOUNDRY_ARTIFACT);
        write(dir.path(), "Legacy.sol/CreditScore.json", HARDHAT_ARTIFACT);

        let store = ArtifactStore::new(ArtifactLayout::Foundry, dir.path());

        let err = store
            .load(&ContractSpec::name("CreditScore"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Multiple artifacts"));

        let artifact = store
            .load(&"Legacy.sol:CreditScore".parse()?)
            .await?;
        assert_eq!(artifact.bytecode.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn foundry_source_path_uses_file_name() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "CreditScore.sol/CreditScore.json", FOUNDRY_ARTIFACT);

        let store = ArtifactStore::new(ArtifactLayout::Foundry, dir.path());
        let artifact = store
            .load(&"src/CreditScore.sol:CreditScore".parse()?)
            .await?;

        assert_eq!(artifact.name, "CreditScore");

        Ok(())
    }

    #[tokio::test]
    async fn hardhat_source_path_is_kept_whole() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "contracts/CreditScore.sol/CreditScore.json",
            HARDHAT_ARTIFACT,
        );

        let store = ArtifactStore::new(ArtifactLayout::Hardhat, dir.path());
        let artifact = store
            .load(&"contracts/CreditScore.sol:CreditScore".parse()?)
            .await?;
        assert_eq!(artifact.bytecode.len(), 5);

        let err = store
            .load(&"CreditScore.sol:CreditScore".parse()?)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));

        Ok(())
    }
}
