/*!
 * Karaoke subtitle generation core.
 *
 * Pure, sequential transformations from raw transcription timestamps to
 * subtitle documents on disk:
 * - `normalizer`: repairs the engine's raw (segment, word) timestamps
 * - `karaoke`: groups normalized words into renderable karaoke lines
 * - `ass`: Advanced SubStation Alpha serialization with per-word highlight tags
 * - `srt`: SubRip serialization (no per-word highlighting) and parsing
 * - `coordinator`: renders one or both formats and writes them to disk
 *
 * Each stage owns its input and produces a fresh immutable sequence; no
 * shared mutable state crosses stage boundaries.
 */

pub mod normalizer;
pub mod karaoke;
pub mod ass;
pub mod srt;
pub mod coordinator;

pub use normalizer::{NormalizedSegment, TimedWord, TimingOrigin, normalize};
pub use karaoke::{KaraokeLine, LinePolicy, LineWord, build_lines};
pub use ass::AssStyle;
pub use coordinator::SubtitleFormat;
