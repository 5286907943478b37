//! Message formatters.
//!
//! This module formats the text sent to Matrix rooms: command replies and
//! player count alerts. Replies use Markdown, the transport renders it.

/// Formats the reply to the `!players` command.
///
/// # Arguments
///
/// * `server_address` - Address of the monitored server
/// * `count` - Number of players currently online
///
/// # Examples
///
/// ```
/// # use tally::commands::markdown_response::format_players;
/// let reply = format_players("play.example.com", 8);
/// assert!(reply.contains("8"));
/// ```
pub fn format_players(server_address: &str, count: u32) -> String {
    format!(
        "🌐 **Server**: {}\n👥 **Players**: {}",
        server_address, count
    )
}

/// Formats the reply sent when the player count could not be retrieved.
pub fn format_players_error() -> String {
    "❌ Error while fetching server data".to_owned()
}

/// Formats the alert sent to the destination room when enough players are online.
///
/// # Arguments
///
/// * `count` - Number of players currently online
/// * `server_address` - Address of the monitored server
///
/// # Examples
///
/// ```
/// # use tally::commands::markdown_response::format_alert;
/// let alert = format_alert(6, "play.example.com");
/// assert!(alert.starts_with("🚨 ALERT!"));
/// ```
pub fn format_alert(count: u32, server_address: &str) -> String {
    format!(
        "🚨 ALERT!\n👥 {} players online\n🌐 Server: {}\n🚀 Join now! ⚡",
        count, server_address
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_players() {
        assert_eq!(
            format_players("play.example.com", 8),
            "🌐 **Server**: play.example.com\n👥 **Players**: 8"
        );
    }

    #[test]
    fn test_format_players_zero() {
        let reply = format_players("play.example.com", 0);
        assert_eq!(reply.lines().count(), 2);
        assert!(reply.ends_with("0"));
    }

    #[test]
    fn test_format_players_error() {
        assert_eq!(format_players_error(), "❌ Error while fetching server data");
    }

    #[test]
    fn test_format_alert() {
        assert_eq!(
            format_alert(6, "play.example.com"),
            "🚨 ALERT!\n👥 6 players online\n🌐 Server: play.example.com\n🚀 Join now! ⚡"
        );
    }
}
