use crate::ship::ShipKind;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;

/// Fleet in placement order.
pub const FLEET: [ShipKind; NUM_SHIPS] = [
    ShipKind::Carrier,
    ShipKind::Battleship,
    ShipKind::Cruiser,
    ShipKind::Submarine,
    ShipKind::Destroyer,
];

/// Total number of ship segments used in the standard configuration.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Random trials per ship before random placement gives up.
pub const MAX_PLACEMENT_TRIALS: usize = 1000;

/// Whole-fleet attempts made by `place_fleet_random` before surfacing exhaustion.
pub const FLEET_PLACEMENT_ATTEMPTS: usize = 16;

/// Random samples drawn by the AI in hunt mode before scanning.
pub const HUNT_SAMPLES: usize = 2000;

/// Last-resort AI coordinate once every cell has been visited.
pub const FALLBACK_TARGET: crate::common::Coordinate = crate::common::Coordinate::new(0, 0);

#[cfg(feature = "std")]
pub use session_config::SessionConfig;

#[cfg(feature = "std")]
mod session_config {
    use std::time::Duration;

    /// Default pause before the solo AI answers a shot.
    const DEFAULT_AI_DELAY: Duration = Duration::from_secs(2);

    /// Maximum encoded message size accepted by transports (64 KiB).
    const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024;

    /// Default timeout for a single frame write.
    const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

    /// Runtime settings for sessions and their transports.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SessionConfig {
        pub ai_delay: Duration,
        pub max_frame_size: u32,
        pub send_timeout: Duration,
        pub display_name: String,
    }

    impl Default for SessionConfig {
        fn default() -> Self {
            Self {
                ai_delay: DEFAULT_AI_DELAY,
                max_frame_size: DEFAULT_MAX_FRAME_SIZE,
                send_timeout: DEFAULT_SEND_TIMEOUT,
                display_name: "Anonymous".to_string(),
            }
        }
    }

    impl SessionConfig {
        pub fn with_ai_delay(mut self, delay: Duration) -> Self {
            self.ai_delay = delay;
            self
        }

        pub fn with_max_frame_size(mut self, bytes: u32) -> Self {
            self.max_frame_size = bytes;
            self
        }

        pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
            self.send_timeout = timeout;
            self
        }

        /// Blank names fall back to `Anonymous`.
        pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
            let name = name.into();
            let trimmed = name.trim();
            self.display_name = if trimmed.is_empty() {
                "Anonymous".to_string()
            } else {
                trimmed.to_string()
            };
            self
        }
    }
}
