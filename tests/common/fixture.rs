//! The fixture guild every integration test runs in.

use imbot::api::{
    Channel, ChannelId, Guild, GuildId, Member, Permission, Role, RoleId, User, UserId,
};

pub const GUILD: GuildId = 1;
pub const CHANNEL: ChannelId = 100;
pub const BOT: UserId = 1000;

pub const OWNER: UserId = 10;
/// Holds the admin role.
pub const ADMIN: UserId = 11;
/// Holds only the member role.
pub const ALICE: UserId = 12;
/// Holds only the member role; nickname "Bobby".
pub const BOB: UserId = 13;

pub const ADMIN_ROLE: RoleId = 20;
pub const MEMBER_ROLE: RoleId = 21;
pub const BOT_ROLE: RoleId = 22;
/// Positioned above the bot's role.
pub const STAFF_ROLE: RoleId = 23;
/// Unmentionable, below the bot's role.
pub const PING_ROLE: RoleId = 24;

fn role(id: RoleId, name: &str, position: i64, permissions: Vec<Permission>) -> Role {
    Role {
        id,
        name: name.to_string(),
        position,
        permissions,
        mentionable: false,
    }
}

pub fn guild() -> Guild {
    Guild {
        id: GUILD,
        name: "Test Guild".into(),
        owner_id: OWNER,
        roles: vec![
            role(GUILD, "@everyone", 0, vec![Permission::SendMessages]),
            role(ADMIN_ROLE, "Admins", 5, vec![Permission::Administrator]),
            role(MEMBER_ROLE, "Members", 1, vec![]),
            role(
                BOT_ROLE,
                "InviteManager",
                8,
                vec![Permission::ManageRoles, Permission::AddReactions],
            ),
            role(STAFF_ROLE, "Staff", 10, vec![]),
            role(PING_ROLE, "Announcements", 2, vec![]),
        ],
        channels: vec![Channel {
            id: CHANNEL,
            name: "general".into(),
        }],
    }
}

pub fn member(id: UserId, name: &str, nick: Option<&str>, roles: Vec<RoleId>) -> Member {
    Member {
        user: User {
            id,
            name: name.to_string(),
            bot: id == BOT,
        },
        nick: nick.map(str::to_string),
        roles,
    }
}

pub fn members() -> Vec<Member> {
    vec![
        member(OWNER, "owner", None, vec![]),
        member(ADMIN, "admin", None, vec![ADMIN_ROLE]),
        member(ALICE, "alice", None, vec![MEMBER_ROLE]),
        member(BOB, "bob", Some("Bobby"), vec![MEMBER_ROLE]),
        member(BOT, "InviteManager", None, vec![BOT_ROLE]),
    ]
}

pub const CONFIG: &str = r#"
[bot]
user_id = 1000

[bot.links]
add = "https://example.org/add-bot"
support = "https://example.org/support"

[database]
path = ":memory:"
"#;
