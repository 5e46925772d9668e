// CommandRouter - Routes CLI arguments to appropriate Command
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::{
    ApiServerCommand, CadenceCommand, CheckCommand, Command, ConfigExampleCommand,
    MatchKeyCommand, PlanCommand,
};
use crate::Args;

/// CommandRouter determines which Command to execute based on CLI arguments
///
/// Routing priority:
/// 1. Example config generation (--config-example, --api-config-example)
/// 2. API server mode (--serve)
/// 3. Key matching (--match-cert, --match-key)
/// 4. Plan status (--plan-status)
/// 5. Cadence lookup (--cadence)
/// 6. Certificate check (default)
pub struct CommandRouter;

impl CommandRouter {
    /// Route CLI arguments to the appropriate Command
    ///
    /// Call [`Args::validate`] first; the router assumes at most one mode is
    /// requested and falls back to [`CheckCommand`].
    pub fn route(args: Args) -> Box<dyn Command> {
        if args.config_example.is_some() || args.api_server.config_example.is_some() {
            return Box::new(ConfigExampleCommand::new(args));
        }

        if args.api_server.enable {
            return Box::new(ApiServerCommand::new(args));
        }

        if args.key.requested() {
            return Box::new(MatchKeyCommand::new(args));
        }

        if args.plan_status {
            return Box::new(PlanCommand::new(args));
        }

        if args.cadence.is_some() {
            return Box::new(CadenceCommand::new(args));
        }

        Box::new(CheckCommand::new(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_route_config_example() {
        let mut args = Args::default();
        args.config_example = Some(PathBuf::from("certwarden.toml"));
        args.api_server.enable = true;
        assert_eq!(CommandRouter::route(args).name(), "ConfigExampleCommand");
    }

    #[test]
    fn test_route_api_server() {
        let mut args = Args::default();
        args.api_server.enable = true;
        assert_eq!(CommandRouter::route(args).name(), "ApiServerCommand");
    }

    #[test]
    fn test_route_match_key() {
        let mut args = Args::default();
        args.key.cert_file = Some(PathBuf::from("cert.pem"));
        args.key.key_file = Some(PathBuf::from("key.pem"));
        assert_eq!(CommandRouter::route(args).name(), "MatchKeyCommand");
    }

    #[test]
    fn test_route_plan_status() {
        let mut args = Args::default();
        args.plan_status = true;
        assert_eq!(CommandRouter::route(args).name(), "PlanCommand");
    }

    #[test]
    fn test_route_cadence() {
        let mut args = Args::default();
        args.cadence = Some("daily".to_string());
        assert_eq!(CommandRouter::route(args).name(), "CadenceCommand");
    }

    #[test]
    fn test_route_default_is_check() {
        let mut args = Args::default();
        args.urls = vec!["example.com".to_string()];
        assert_eq!(CommandRouter::route(args).name(), "CheckCommand");
        assert_eq!(CommandRouter::route(Args::default()).name(), "CheckCommand");
    }
}
