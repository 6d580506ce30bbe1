/// Application constants

// Player records
pub const STARTING_LEVEL: i32 = 1;
pub const STARTING_EXPERIENCE: i64 = 0;

// Game board
pub const GRID_SIZE: u8 = 10;
pub const SQUIRREL_START: (u8, u8) = (1, 1);

// Cache
pub const DEFAULT_CACHE_NAME: &str = "squirrel-game";
pub const SQUIRREL_KEY_SUFFIX: &str = "squirrel";
pub const PLAYER_NAMES_KEY_SUFFIX: &str = "players:names";
pub const PLAYER_LEVELS_KEY_SUFFIX: &str = "players:levels";
pub const PLAYER_SEEN_KEY_SUFFIX: &str = "players:seen";
pub const PLAYER_UPDATES_CHANNEL_SUFFIX: &str = "player-updates";

// Disposable tokens
pub const DEFAULT_TOKEN_EXPIRY_MINUTES: u64 = 30;
pub const TOKEN_ISSUER: &str = "squirrel-backend";

// Client polling
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_MAX_POLL_BACKOFF_MS: u64 = 30000;

// Background service intervals
pub const DEFAULT_SQUIRREL_MOVE_INTERVAL_SECS: u64 = 3;

// Players not seen for this long drop off the roster
pub const DEFAULT_ROSTER_TTL_SECS: u64 = 120;

// Internal calls
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

// API version
pub const API_VERSION: &str = "v1";

// Shown to clients on any internal failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";
