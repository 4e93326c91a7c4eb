//! # Bot Messages
//!
//! Markdown replies and announcements posted by the bot.

use crate::rooms::RoomType;
use crate::version::types::{VersionChange, VersionMap};

pub const PRODUCT_NAME: &str = "Webex Teams";

pub const HELP_GROUP: &str = concat!(
    "## Webex Teams Update Notifier\n",
    "Thank you for adding me to your space. I am here to alert you when new versions of ",
    "Webex Teams are released by Cisco. I will do this automatically unless you ask me not to.\n",
    "\n",
    "* If you want to stop receiving automatic updates simply @mention me and type `unsubscribe`.\n",
    "\n",
    "* If you want to opt back in simply @mention me and type `subscribe`."
);

pub const HELP_DIRECT: &str = concat!(
    "## Webex Teams Update Notifier\n",
    "Thank you for adding me to your space. I am here to alert you when new versions of ",
    "Webex Teams are released by Cisco. I will do this automatically unless you ask me not to.\n",
    "\n",
    "* If you want to stop receiving automatic updates simply type `unsubscribe`.\n",
    "\n",
    "* If you want to opt back in simply type `subscribe`."
);

pub const SUBSCRIBED: &str = "This room is now subscribed to update announcements.";

pub const UNSUBSCRIBED: &str = "This room is now unsubscribed from update announcements.";

pub const FEED_UNAVAILABLE: &str =
    "Sorry, I couldn't fetch the latest Webex Teams versions right now. Please try again later.";

pub const LEARN_MORE: &str = "Learn more about what's new in the [Webex Teams release notes](https://help.webex.com/en-us/mqkve8/Webex-Release-Notes).";

/// Help text for the room type; group rooms need an @mention to reach the bot
pub fn help_text(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::Group => HELP_GROUP,
        RoomType::Direct => HELP_DIRECT,
    }
}

/// One line per platform describing its current release
pub fn latest_version_lines(versions: &VersionMap) -> Vec<String> {
    versions
        .iter()
        .map(|(platform, version)| {
            format!("The latest version of {PRODUCT_NAME} for {platform} is **{version}**")
        })
        .collect()
}

/// Announcement sent to every subscribed room when releases change
pub fn update_notification(changes: &[VersionChange]) -> String {
    let mut message = format!("## A new version of {PRODUCT_NAME} is available\n\n");
    for change in changes {
        message.push_str(&format!(
            "* {PRODUCT_NAME} for {} is now at **{}**\n",
            change.platform, change.version
        ));
    }
    message.push('\n');
    message.push_str(LEARN_MORE);
    message
}
