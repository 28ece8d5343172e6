//! Spelling session: word sequencing, scoring and delayed effects
//!
//! A [`Session`] owns the current [`RoundState`] and everything around it.
//! Every inbound operation returns the [`EngineEvent`]s it produced so the
//! host can play sounds, speak words or redraw.
//!
//! Animation pacing (evaluate shortly after the last slot fills, advance a
//! moment after a correct answer) is a queue of pending effects on the
//! session's own timeline, advanced by [`Session::tick`]. Each effect carries
//! the [`RoundToken`] current when it was scheduled; reset and skip change the
//! token, so effects from an abandoned board are dropped instead of applied.

use super::generator::{generate_pool, pool_size_for};
use super::matcher::{DropMiss, RoundState, Verdict};
use super::tile::{AnswerSlot, Area, LetterTile, Point, TileId};
use super::words::{Difficulty, WordPool};
use crate::config::EngineConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Identity of one board: which word, and how many times it was reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundToken {
    pub word: u32,
    pub epoch: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, no word drawn yet.
    Idle,
    /// Accepting drags.
    Playing,
    /// All slots filled, evaluation pending.
    Evaluating,
    /// Correct answer, advance pending.
    Solved,
    /// Word list exhausted.
    Finished,
}

/// Outbound notifications for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    WordStarted { word: String, remaining: usize },
    SlotCleared { slot: usize, tile: TileId },
    DropAccepted { tile: TileId, slot: usize },
    DropRejected { tile: TileId, reason: DropMiss },
    Correct { word: String, points: u32 },
    Incorrect { word: String, attempt: String },
    BoardReset,
    Skipped { word: String },
    ScoreChanged { delta: u32, total: u32 },
    RoundComplete { score: u32, solved: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Evaluate,
    Advance,
}

#[derive(Debug, Clone, Copy)]
struct PendingEffect {
    due: Duration,
    token: RoundToken,
    effect: Effect,
}

pub struct Session {
    config: EngineConfig,
    difficulty: Difficulty,
    rng: StdRng,
    words: WordPool,
    round: Option<RoundState>,
    token: RoundToken,
    phase: Phase,
    score: u32,
    solved: u32,
    skipped: u32,
    misses: u32,
    clock: Duration,
    pending: Vec<PendingEffect>,
    play_area: Area,
    screen: Area,
}

impl Session {
    /// Session over a difficulty's word list with an OS-seeded RNG.
    pub fn new(difficulty: Difficulty, config: EngineConfig) -> Self {
        Self::build(difficulty, WordPool::new(difficulty), config, StdRng::from_os_rng())
    }

    /// Deterministic session for replays and tests.
    pub fn with_seed(difficulty: Difficulty, config: EngineConfig, seed: u64) -> Self {
        Self::build(
            difficulty,
            WordPool::new(difficulty),
            config,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Session over an explicit word pool.
    pub fn with_words(words: WordPool, config: EngineConfig, seed: u64) -> Self {
        Self::build(Difficulty::default(), words, config, StdRng::seed_from_u64(seed))
    }

    fn build(difficulty: Difficulty, words: WordPool, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            config,
            difficulty,
            rng,
            words,
            round: None,
            token: RoundToken::default(),
            phase: Phase::Idle,
            score: 0,
            solved: 0,
            skipped: 0,
            misses: 0,
            clock: Duration::ZERO,
            pending: Vec::new(),
            play_area: Area::default(),
            screen: Area::default(),
        }
    }

    /// Draw the first word.
    pub fn start(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.phase == Phase::Idle {
            info!(difficulty = %self.difficulty, words = self.words.remaining(), "session started");
            self.advance(&mut events);
        }
        events
    }

    /// Screen size used for answer-band and slot-row matching.
    pub fn set_viewport(&mut self, screen: Area) {
        self.screen = screen;
    }

    /// Record the play area size and lay out the pool if it is not yet.
    /// Returns how many tiles were positioned.
    pub fn measure_play_area(&mut self, area: Area) -> usize {
        self.play_area = area;
        match self.round.as_mut() {
            Some(round) => round.apply_layout(area, &self.config),
            None => 0,
        }
    }

    pub fn drag_start(&mut self, tile: TileId) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Playing {
            debug!(tile = %tile, phase = ?self.phase, "drag refused while busy");
            return events;
        }
        let Some(round) = self.round.as_mut() else {
            return events;
        };
        match round.drag_start(tile) {
            Ok(Some(slot)) => events.push(EngineEvent::SlotCleared { slot, tile }),
            Ok(None) => {}
            Err(err) => debug!(%err, "drag start ignored"),
        }
        events
    }

    pub fn drag_move(&mut self, tile: TileId, dx: f32, dy: f32) {
        if let Some(round) = self.round.as_mut() {
            if let Err(err) = round.drag_move(tile, dx, dy) {
                trace!(%err, "drag move ignored");
            }
        }
    }

    pub fn drag_end(&mut self, tile: TileId, release: Point) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(round) = self.round.as_mut() else {
            return events;
        };
        match round.drag_end(tile, release, self.screen, &self.config) {
            Ok(Ok(slot)) => {
                debug!(tile = %tile, slot, "drop accepted");
                events.push(EngineEvent::DropAccepted { tile, slot });
                if round.all_filled() {
                    self.phase = Phase::Evaluating;
                    self.schedule(Effect::Evaluate, self.config.evaluate_delay());
                }
            }
            Ok(Err(reason)) => {
                debug!(tile = %tile, %reason, "drop rejected");
                events.push(EngineEvent::DropRejected { tile, reason });
            }
            Err(err) => debug!(%err, "drag end ignored"),
        }
        events
    }

    /// Clear the board and send every tile home, keeping the pool.
    pub fn reset(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if !matches!(self.phase, Phase::Playing | Phase::Evaluating) {
            return events;
        }
        if let Some(round) = self.round.as_mut() {
            round.clear();
        }
        self.token.epoch += 1;
        self.phase = Phase::Playing;
        debug!(token = ?self.token, "board reset");
        events.push(EngineEvent::BoardReset);
        events
    }

    /// Abandon the current word without scoring.
    pub fn skip(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Playing | Phase::Evaluating => {
                if let Some(round) = &self.round {
                    info!(word = round.word(), "word skipped");
                    events.push(EngineEvent::Skipped {
                        word: round.word().to_string(),
                    });
                }
                self.skipped += 1;
                self.advance(&mut events);
            }
            // Already scored; just stop waiting.
            Phase::Solved => self.advance(&mut events),
            Phase::Idle | Phase::Finished => {}
        }
        events
    }

    /// Advance the timeline and run effects that came due.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.clock += elapsed;
        let now = self.clock;

        let (mut due, later): (Vec<PendingEffect>, Vec<PendingEffect>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = later;
        due.sort_by_key(|p| p.due);

        for pending in due {
            if pending.token != self.token {
                debug!(effect = ?pending.effect, token = ?pending.token, "dropped stale effect");
                continue;
            }
            match pending.effect {
                Effect::Evaluate => self.evaluate(&mut events),
                Effect::Advance => self.advance(&mut events),
            }
        }
        events
    }

    fn evaluate(&mut self, events: &mut Vec<EngineEvent>) {
        if self.phase != Phase::Evaluating {
            return;
        }
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let word = round.word().to_string();
        match round.evaluate() {
            Verdict::Correct => {
                let points = word.trim().chars().count() as u32 * self.config.points_per_letter;
                self.score += points;
                self.solved += 1;
                self.phase = Phase::Solved;
                info!(word = %word, points, total = self.score, "word spelled correctly");
                events.push(EngineEvent::Correct { word, points });
                events.push(EngineEvent::ScoreChanged {
                    delta: points,
                    total: self.score,
                });
                self.schedule(Effect::Advance, self.config.advance_delay());
            }
            Verdict::Incorrect { attempt } => {
                round.clear();
                self.misses += 1;
                self.phase = Phase::Playing;
                info!(word = %word, attempt = %attempt, "incorrect attempt");
                events.push(EngineEvent::Incorrect { word, attempt });
            }
        }
    }

    fn advance(&mut self, events: &mut Vec<EngineEvent>) {
        self.token = RoundToken {
            word: self.token.word + 1,
            epoch: 0,
        };
        self.pending.clear();

        let Some(word) = self.words.draw(&mut self.rng) else {
            self.round = None;
            self.phase = Phase::Finished;
            info!(score = self.score, solved = self.solved, "word list exhausted");
            events.push(EngineEvent::RoundComplete {
                score: self.score,
                solved: self.solved,
            });
            return;
        };

        let size = pool_size_for(word.trim().chars().count(), self.config.pool_size);
        let tiles = generate_pool(&word, size, &mut self.rng);
        let mut round = RoundState::new(&word, tiles);
        if self.play_area.is_measured() {
            round.apply_layout(self.play_area, &self.config);
        }
        debug!(word = %word, token = ?self.token, "word started");
        self.round = Some(round);
        self.phase = Phase::Playing;
        events.push(EngineEvent::WordStarted {
            word,
            remaining: self.words.remaining(),
        });
    }

    fn schedule(&mut self, effect: Effect, delay: Duration) {
        self.pending.push(PendingEffect {
            due: self.clock + delay,
            token: self.token,
            effect,
        });
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while drags are refused.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Evaluating | Phase::Solved)
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn round_token(&self) -> RoundToken {
        self.token
    }

    pub fn target_word(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.word())
    }

    pub fn tiles(&self) -> &[LetterTile] {
        self.round.as_ref().map(|r| r.tiles()).unwrap_or(&[])
    }

    pub fn slots(&self) -> &[AnswerSlot] {
        self.round.as_ref().map(|r| r.slots()).unwrap_or(&[])
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn solved_count(&self) -> u32 {
        self.solved
    }

    pub fn skipped_count(&self) -> u32 {
        self.skipped
    }

    pub fn miss_count(&self) -> u32 {
        self.misses
    }

    pub fn remaining_words(&self) -> usize {
        self.words.remaining()
    }

    pub fn pending_effects(&self) -> usize {
        self.pending.len()
    }

    pub fn screen(&self) -> Area {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::matcher::slot_center_x;
    use crate::game::tile::TileState;
    use std::collections::HashSet;

    const SCREEN: Area = Area::new(400.0, 800.0);
    const PLAY_AREA: Area = Area::new(400.0, 300.0);
    const BAND_Y: f32 = 200.0;

    fn session(words: &[&str], seed: u64) -> Session {
        let mut session = Session::with_words(
            WordPool::from_words(words.iter().copied()),
            EngineConfig::default(),
            seed,
        );
        session.set_viewport(SCREEN);
        session.measure_play_area(PLAY_AREA);
        session
    }

    fn pick_tiles(session: &Session, letters: &str) -> Vec<TileId> {
        let mut used = HashSet::new();
        letters
            .chars()
            .map(|c| {
                let tile = session
                    .tiles()
                    .iter()
                    .find(|t| t.letter == c.to_ascii_uppercase() && !used.contains(&t.id))
                    .expect("letter in pool");
                used.insert(tile.id);
                tile.id
            })
            .collect()
    }

    fn spell(session: &mut Session, letters: &str) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let count = session.slots().len();
        for (slot, id) in pick_tiles(session, letters).into_iter().enumerate() {
            let x = slot_center_x(slot, count, SCREEN.width, session.config());
            events.extend(session.drag_start(id));
            session.drag_move(id, 0.0, -150.0);
            events.extend(session.drag_end(id, Point::new(x, BAND_Y)));
        }
        events
    }

    #[test]
    fn test_start_draws_first_word() {
        let mut s = session(&["crab"], 1);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.round().is_none());
        assert_eq!(s.screen(), SCREEN);
        let events = s.start();
        assert_eq!(
            events,
            vec![EngineEvent::WordStarted {
                word: "crab".into(),
                remaining: 0
            }]
        );
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.tiles().len(), 15);
        assert_eq!(s.slots().len(), 4);
        assert!(s.tiles().iter().all(|t| t.is_positioned()));
        assert_eq!(s.round().map(|r| r.word()), Some("crab"));
        assert!(s.round().is_some_and(|r| r.is_laid_out()));
    }

    #[test]
    fn test_crab_spelled_in_order_scores_forty() {
        let mut s = session(&["crab", "frog"], 2);
        s.start();
        let events = spell(&mut s, "crab");
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EngineEvent::DropAccepted { .. }))
                .count(),
            4
        );
        assert_eq!(s.phase(), Phase::Evaluating);

        assert!(s.tick(Duration::from_millis(499)).is_empty());
        let events = s.tick(Duration::from_millis(1));
        assert_eq!(
            events,
            vec![
                EngineEvent::Correct {
                    word: "crab".into(),
                    points: 40
                },
                EngineEvent::ScoreChanged {
                    delta: 40,
                    total: 40
                },
            ]
        );
        assert_eq!(s.score(), 40);
        assert_eq!(s.phase(), Phase::Solved);

        let events = s.tick(Duration::from_millis(1500));
        assert_eq!(
            events,
            vec![EngineEvent::WordStarted {
                word: "frog".into(),
                remaining: 0
            }]
        );
        assert_eq!(s.slots().len(), 4);
        assert!(s.slots().iter().all(|slot| !slot.is_filled()));
    }

    #[test]
    fn test_crab_misspelled_resets_board() {
        let mut s = session(&["crab"], 3);
        s.start();
        let pool: Vec<(TileId, char)> = s.tiles().iter().map(|t| (t.id, t.letter)).collect();
        spell(&mut s, "carb");

        let events = s.tick(Duration::from_millis(500));
        assert_eq!(
            events,
            vec![EngineEvent::Incorrect {
                word: "crab".into(),
                attempt: "CARB".into()
            }]
        );
        assert_eq!(s.score(), 0);
        assert_eq!(s.miss_count(), 1);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.slots().iter().all(|slot| !slot.is_filled()));
        for tile in s.tiles() {
            assert_eq!(tile.state, TileState::AtHome);
            assert_eq!(Some(tile.position), tile.home);
        }
        let after: Vec<(TileId, char)> = s.tiles().iter().map(|t| (t.id, t.letter)).collect();
        assert_eq!(pool, after);

        // Same board can be solved afterwards
        spell(&mut s, "crab");
        assert!(matches!(
            s.tick(Duration::from_millis(500)).first(),
            Some(EngineEvent::Correct { .. })
        ));
    }

    #[test]
    fn test_drop_outside_band_is_rejected() {
        let mut s = session(&["crab"], 4);
        s.start();
        let id = s.tiles()[0].id;
        s.drag_start(id);
        s.drag_move(id, 10.0, 10.0);
        let events = s.drag_end(id, Point::new(110.0, 600.0));
        assert_eq!(
            events,
            vec![EngineEvent::DropRejected {
                tile: id,
                reason: DropMiss::OutsideAnswerBand
            }]
        );
        assert!(s.slots().iter().all(|slot| !slot.is_filled()));
        assert_eq!(Some(s.tiles()[0].position), s.tiles()[0].home);
    }

    #[test]
    fn test_drags_refused_while_evaluating() {
        let mut s = session(&["crab"], 5);
        s.start();
        spell(&mut s, "crab");
        assert!(s.is_busy());
        let consumed = s.tiles().iter().find(|t| t.is_consumed()).unwrap().id;
        assert!(s.drag_start(consumed).is_empty());
        assert!(s.tiles().iter().find(|t| t.id == consumed).unwrap().is_consumed());
        assert!(s.slots().iter().all(|slot| slot.is_filled()));
    }

    #[test]
    fn test_reset_cancels_pending_evaluation() {
        let mut s = session(&["crab"], 6);
        s.start();
        spell(&mut s, "crab");
        assert_eq!(s.pending_effects(), 1);
        let before = s.round_token();

        assert_eq!(s.reset(), vec![EngineEvent::BoardReset]);
        let after = s.round_token();
        assert_eq!(after.word, before.word);
        assert_eq!(after.epoch, before.epoch + 1);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.tick(Duration::from_secs(5)).is_empty());
        assert_eq!(s.score(), 0);
        assert!(s.slots().iter().all(|slot| !slot.is_filled()));
    }

    #[test]
    fn test_reset_mid_drag_sends_tile_home() {
        let mut s = session(&["crab"], 7);
        s.start();
        let id = s.tiles()[3].id;
        s.drag_start(id);
        s.drag_move(id, 50.0, -50.0);
        s.reset();
        let tile = &s.tiles()[3];
        assert_eq!(tile.state, TileState::AtHome);
        assert_eq!(Some(tile.position), tile.home);
        // The release after the reset is ignored
        assert!(s.drag_end(id, Point::new(110.0, BAND_Y)).is_empty());
    }

    #[test]
    fn test_skip_advances_without_score() {
        let mut s = session(&["crab", "frog"], 8);
        s.start();
        let first = s.target_word().unwrap().to_string();
        let token = s.round_token();
        let events = s.skip();
        assert_eq!(s.round_token().word, token.word + 1);
        assert_eq!(s.round_token().epoch, 0);
        assert_eq!(events[0], EngineEvent::Skipped { word: first.clone() });
        assert!(matches!(events[1], EngineEvent::WordStarted { .. }));
        assert_eq!(s.score(), 0);
        assert_eq!(s.skipped_count(), 1);
        assert_ne!(s.target_word().unwrap(), first);

        let events = s.skip();
        assert_eq!(
            events.last(),
            Some(&EngineEvent::RoundComplete { score: 0, solved: 0 })
        );
        assert_eq!(s.phase(), Phase::Finished);
        assert!(s.tiles().is_empty());
        assert!(s.skip().is_empty());
    }

    #[test]
    fn test_skip_drops_stale_evaluation() {
        let mut s = session(&["crab", "frog"], 9);
        s.start();
        let first = s.target_word().unwrap().to_string();
        let letters = if first == "crab" { "crab" } else { "frog" };
        spell(&mut s, letters);
        assert_eq!(s.phase(), Phase::Evaluating);

        s.skip();
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.tick(Duration::from_secs(5)).is_empty());
        assert_eq!(s.score(), 0);
        assert_eq!(s.solved_count(), 0);
    }

    #[test]
    fn test_skip_while_solved_does_not_double_advance() {
        let mut s = session(&["crab", "frog", "fish"], 10);
        s.start();
        let first = s.target_word().unwrap().to_string();
        spell(&mut s, &first);
        s.tick(Duration::from_millis(500));
        assert_eq!(s.phase(), Phase::Solved);

        let events = s.skip();
        assert!(matches!(events.as_slice(), [EngineEvent::WordStarted { .. }]));
        assert_eq!(s.skipped_count(), 0);
        assert_eq!(s.remaining_words(), 1);
        assert!(s.tick(Duration::from_secs(5)).is_empty());
        assert_eq!(s.remaining_words(), 1);
    }

    #[test]
    fn test_layout_waits_for_measurement() {
        let mut s = Session::with_words(
            WordPool::from_words(["crab", "frog"]),
            EngineConfig::default(),
            11,
        );
        s.set_viewport(SCREEN);
        s.start();
        assert!(s.tiles().iter().all(|t| t.state == TileState::InPool));
        assert_eq!(s.measure_play_area(Area::new(0.0, 0.0)), 0);
        assert_eq!(s.measure_play_area(PLAY_AREA), 15);
        assert_eq!(s.measure_play_area(Area::new(800.0, 600.0)), 0);

        // Later words are laid out as soon as they start
        s.skip();
        assert!(s.tiles().iter().all(|t| t.is_positioned()));
    }

    #[test]
    fn test_long_word_gets_larger_pool() {
        let mut s = session(&["internationalization"], 12);
        s.start();
        assert_eq!(s.tiles().len(), 20);
        assert_eq!(s.slots().len(), 20);
    }

    #[test]
    fn test_finishing_last_word_completes_round() {
        let mut s = session(&["crab"], 13);
        s.start();
        spell(&mut s, "crab");
        s.tick(Duration::from_millis(500));
        let events = s.tick(Duration::from_millis(1500));
        assert_eq!(
            events,
            vec![EngineEvent::RoundComplete {
                score: 40,
                solved: 1
            }]
        );
        assert_eq!(s.phase(), Phase::Finished);
    }
}
