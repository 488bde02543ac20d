//! Block explorer links.

use crate::blockchain::types::{Cluster, Signature};

/// Link to a transaction on the block explorer.
///
/// Mainnet links carry no `cluster` parameter.
pub fn explorer_tx_url(base_url: &str, signature: &Signature, cluster: Cluster) -> String {
    let base = base_url.trim_end_matches('/');
    match cluster.explorer_param() {
        Some(param) => format!("{}/tx/{}?cluster={}", base, signature, param),
        None => format!("{}/tx/{}", base, signature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devnet_link() {
        let signature = Signature([1u8; 64]);
        let url = explorer_tx_url("https://explorer.solana.com/", &signature, Cluster::Devnet);
        assert_eq!(
            url,
            format!("https://explorer.solana.com/tx/{}?cluster=devnet", signature)
        );
    }

    #[test]
    fn test_mainnet_link_has_no_cluster() {
        let signature = Signature([1u8; 64]);
        let url = explorer_tx_url("https://explorer.solana.com", &signature, Cluster::MainnetBeta);
        assert!(!url.contains('?'));
    }
}
