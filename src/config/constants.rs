// * Configuration Constants
// * Central location for all configurable thresholds, delays and source conventions

// * Root of the title pages on the source site
pub const DEFAULT_BASE_URL: &str = "https://www.imdb.com";

// * Sentinel written for any text field no strategy could resolve
pub const UNKNOWN: &str = "NA";

// * Sentinel written for an unresolved score
pub const SCORE_UNKNOWN: f64 = -1.0;

// * Creator/director text when every structured credit is an organization
pub const ORGANIZATION_CREDIT: &str = "This was created by an Organization";

// * Separator used when a list is flattened into a single column
pub const LIST_SEPARATOR: &str = ", ";

// * Malformed structured-data backoff: base + n * increment, abandoned at the ceiling
pub const RETRY_BASE_DELAY_SECS: u64 = 100;
pub const RETRY_DELAY_INCREMENT_SECS: u64 = 20;
pub const RETRY_DELAY_CEILING_SECS: u64 = 250;

// * Rate-limit pause applied after a batch of successful insertions
pub const PAUSE_AFTER_INSERTS: usize = 1000;
pub const PAUSE_DURATION_SECS: u64 = 120;

// * Storage connection recycling cadence (items processed)
pub const RECYCLE_EVERY_ITEMS: usize = 20;

// * Work-list checkpoint cadence (items processed)
pub const CHECKPOINT_EVERY_ITEMS: usize = 20;

// * Outgoing request pacing
pub const REQUESTS_PER_SECOND: u32 = 1;

// * HTTP request timeout in milliseconds
pub const PAGE_TIMEOUT_MS: u64 = 30_000;

// * Delay before a transient fetch failure escalates to the next tier
pub const ESCALATION_DELAY_SECS: u64 = 10;

// * Genre candidates longer than this are treated as mis-scoped nodes
pub const GENRE_MAX_LEN: usize = 12;

// * Default on-disk locations
pub const DEFAULT_DATABASE_PATH: &str = "data/reel_harvest.sqlite";
pub const DEFAULT_WORKLIST_PATH: &str = "data/worklist.txt";

// * Bodies shorter than this are interstitials or truncated responses, not title pages
pub const MIN_BODY_BYTES: usize = 500;
