use ethers::types::Address;
use ethers::utils::to_checksum;
use reqwest::Url;

pub const SEPOLIA_ETHERSCAN: &str = "https://sepolia.etherscan.io";

/// Etherscan-style block explorer
#[derive(Debug, Clone)]
pub struct Explorer {
    base_url: Url,
}

impl Explorer {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn address_url(&self, address: Address) -> String {
        format!(
            "{}/address/{}",
            self.base_url.as_str().trim_end_matches('/'),
            to_checksum(&address, None)
        )
    }
}
