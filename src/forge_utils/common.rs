use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifies a compiled contract, optionally qualified by the source it
/// was compiled from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub path: Option<PathBuf>,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: PathBuf, name: impl ToString) -> Self {
        Self {
            path: Some(path),
            name: name.to_string(),
        }
    }

    pub fn name(name: impl ToString) -> Self {
        Self {
            path: None,
            name: name.to_string(),
        }
    }
}

impl FromStr for ContractSpec {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let spec = match s.rsplit_once(':') {
            Some((path, name)) => {
                if path.is_empty() {
                    eyre::bail!("Missing source path in `{s}`");
                }

                Self::path_name(PathBuf::from(path), name)
            }
            None => Self::name(s),
        };

        if spec.name.is_empty() {
            eyre::bail!("Missing contract name in `{s}`");
        }

        Ok(spec)
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path.as_deref() {
            write!(f, "{}:{}", path.display(), self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
