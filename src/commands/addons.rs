//! Implementation of the `sprig addons` command.

use crate::addon::AddonId;
use crate::error::Result;

/// List the closed add-on catalog with descriptions.
pub fn cmd_addons() -> Result<()> {
    println!("Available add-ons:");
    println!();
    for addon in AddonId::ALL {
        println!("  {:<16} {}", addon.as_str(), addon.description());
    }
    println!();
    println!("Enable add-ons with: sprig new <name> --addons <id>[,<id>...]");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_succeeds() {
        assert!(cmd_addons().is_ok());
    }

    #[test]
    fn every_addon_has_a_description() {
        for addon in AddonId::ALL {
            assert!(!addon.description().is_empty(), "{} lacks a description", addon);
        }
    }
}
