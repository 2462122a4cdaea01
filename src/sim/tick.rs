//! Fixed timestep simulation tick
//!
//! Moves the paddle and ball, resolves brick hits and drives the phase
//! machine (serve, play, pause, breather between levels, game over).

use glam::Vec2;

use super::collision::collide_ball_bricks;
use super::geometry::clamp;
use super::level::LevelLayout;
use super::state::{GamePhase, GameState, Outcome};
use crate::consts::BREATHER_SECS;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Paddle-left held
    pub left: bool,
    /// Paddle-right held
    pub right: bool,
    /// Launch the stuck ball
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a new run (only honored after game over)
    pub restart: bool,
}

/// What happened to the ball during one motion step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallEvent {
    None,
    /// Ball left through the bottom edge; a life was spent
    Lost,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Serve => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => {
                state.phase = if state.ball.stuck {
                    GamePhase::Serve
                } else {
                    GamePhase::Playing
                };
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused => {}

        GamePhase::GameOver => {
            if input.restart {
                restart(state);
            }
        }

        GamePhase::Serve => {
            move_paddle(state, input.left, input.right, dt);
            if input.launch {
                launch(state);
            }
        }

        GamePhase::Playing => {
            move_paddle(state, input.left, input.right, dt);
            if move_ball(state, dt) == BallEvent::Lost {
                state.phase = GamePhase::Serve;
            } else {
                collide_ball_bricks(state);
            }

            match state.outcome() {
                Outcome::Lost => {
                    log::info!("Game over on level {}", state.level_index + 1);
                    state.phase = GamePhase::GameOver;
                }
                Outcome::Won => {
                    log::info!("Level {} cleared", state.level_index + 1);
                    state.breather_secs = BREATHER_SECS;
                    state.ball.stuck = true;
                    state.phase = GamePhase::Breather;
                }
                Outcome::InProgress => {}
            }
        }

        GamePhase::Breather => {
            state.breather_secs -= dt;
            if state.breather_secs <= 0.0 {
                state.breather_secs = 0.0;
                state.level_index += 1;
                let layout = LevelLayout::generate(state.seed, state.level_index);
                state.load_level(&layout);
            }
        }
    }
}

/// Move the paddle by the held direction, keeping it inside the playfield.
///
/// A stuck ball rides along with the paddle.
pub fn move_paddle(state: &mut GameState, left: bool, right: bool, dt: f32) {
    let axis = right as i32 as f32 - left as i32 as f32;
    let half = state.paddle.bounds.half.x;
    let old_x = state.paddle.bounds.center.x;
    let new_x = clamp(
        old_x + state.tuning.paddle_speed * dt * axis,
        half,
        state.width - half,
    );
    state.paddle.bounds.center.x = new_x;

    if state.ball.stuck {
        state.ball.pos.x += new_x - old_x;
    }
}

/// Release the stuck ball, aimed from the paddle center through the ball
pub fn launch(state: &mut GameState) {
    if !state.ball.stuck {
        return;
    }
    state.ball.vel = (state.ball.pos - state.paddle.bounds.center).normalize_or(Vec2::NEG_Y);
    state.ball.stuck = false;
    state.phase = GamePhase::Playing;
}

/// Integrate a free ball and bounce it off the walls and the paddle.
///
/// Falling out the bottom re-sticks the ball on a re-centered paddle and
/// spends a life.
pub fn move_ball(state: &mut GameState, dt: f32) -> BallEvent {
    if state.ball.stuck {
        return BallEvent::None;
    }

    let speed = state.tuning.ball_speed;
    let ball = &mut state.ball;
    let r = ball.radius;
    ball.pos += ball.vel * speed * dt;

    if ball.pos.x - r <= 0.0 {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = r;
    }
    if ball.pos.x + r >= state.width {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = state.width - r;
    }
    if ball.pos.y - r <= 0.0 {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = r;
    }

    if ball.pos.y - r >= state.height {
        state.lives -= 1;
        state.reset_ball_and_paddle();
        log::info!("Ball lost, {} lives left", state.lives.max(0));
        return BallEvent::Lost;
    }

    if ball.vel.y > 0.0 && ball.bounds().overlaps(&state.paddle.bounds) {
        ball.vel = (ball.pos - state.paddle.bounds.center).normalize_or(Vec2::NEG_Y);
    }

    BallEvent::None
}

/// Fresh run with the same playfield, seed and tuning
pub fn restart(state: &mut GameState) {
    log::info!("Restarting");
    *state = GameState::new(state.width, state.height, state.seed, state.tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{BrickList, Tuning};
    use proptest::prelude::*;

    fn new_state() -> GameState {
        GameState::new(800.0, 600.0, 12345, Tuning::default())
    }

    fn press(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input);
        input
    }

    fn drop_ball(state: &mut GameState) {
        if state.phase == GamePhase::Serve {
            tick(state, &press(|i| i.launch = true), SIM_DT);
        }
        state.ball.pos.y = state.height + state.ball.radius + 20.0;
        tick(state, &TickInput::default(), SIM_DT);
    }

    #[test]
    fn test_tick_serve_to_playing() {
        let mut state = new_state();
        assert_eq!(state.phase, GamePhase::Serve);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Serve);
        assert!(state.ball.stuck);

        tick(&mut state, &press(|i| i.launch = true), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.ball.stuck);
        // Ball sits straight above the paddle center, so it launches straight up
        assert!((state.ball.vel - Vec2::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = new_state();
        tick(&mut state, &press(|i| i.launch = true), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);

        let pause = press(|i| i.pause = true);
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let frozen = state.ball.pos;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.ball.pos, frozen);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_three_misses_do_not_lose() {
        let mut state = new_state();
        for _ in 0..3 {
            drop_ball(&mut state);
        }
        assert_eq!(state.lives, 0);
        assert_eq!(state.outcome(), Outcome::InProgress);
        assert_eq!(state.phase, GamePhase::Serve);
        assert!(state.ball.stuck);
    }

    #[test]
    fn test_four_misses_lose() {
        let mut state = new_state();
        for _ in 0..4 {
            drop_ball(&mut state);
        }
        assert_eq!(state.lives, -1);
        assert_eq!(state.outcome(), Outcome::Lost);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &press(|i| i.restart = true), SIM_DT);
        assert_eq!(state.phase, GamePhase::Serve);
        assert_eq!(state.lives, state.tuning.start_lives);
    }

    #[test]
    fn test_stuck_ball_follows_paddle() {
        let mut state = new_state();
        let offset = state.ball.pos.x - state.paddle.bounds.center.x;
        for _ in 0..30 {
            tick(&mut state, &press(|i| i.left = true), SIM_DT);
        }
        assert!(state.paddle.bounds.center.x < 400.0);
        let moved = state.ball.pos.x - state.paddle.bounds.center.x;
        assert!((moved - offset).abs() < 1e-3);
    }

    #[test]
    fn test_walls_bounce_independently() {
        let mut state = new_state();
        state.bricks = BrickList::default();
        state.non_solid_remaining = 1;
        state.ball.stuck = false;
        state.phase = GamePhase::Playing;

        // Top-left corner: both components flip in the same step
        state.ball.pos = Vec2::new(5.0, 5.0);
        state.ball.vel = Vec2::new(-0.6, -0.8);
        move_ball(&mut state, SIM_DT);
        assert_eq!(state.ball.vel, Vec2::new(0.6, 0.8));
        assert_eq!(state.ball.pos, Vec2::new(10.0, 10.0));

        state.ball.pos = Vec2::new(795.0, 300.0);
        state.ball.vel = Vec2::new(1.0, 0.0);
        move_ball(&mut state, SIM_DT);
        assert_eq!(state.ball.vel.x, -1.0);
        assert_eq!(state.ball.pos.x, 790.0);
    }

    #[test]
    fn test_paddle_catch_only_when_falling() {
        let mut state = new_state();
        state.ball.stuck = false;
        state.phase = GamePhase::Playing;
        let paddle = state.paddle.bounds;

        // Falling onto the right half of the paddle: deflects up and right
        state.ball.pos = Vec2::new(paddle.center.x + 30.0, paddle.min().y - 8.0);
        state.ball.vel = Vec2::Y;
        move_ball(&mut state, 0.0);
        assert!(state.ball.vel.y < 0.0);
        assert!(state.ball.vel.x > 0.0);
        assert!((state.ball.vel.length() - 1.0).abs() < 1e-5);

        // Rising through the paddle: untouched
        state.ball.vel = Vec2::new(0.0, -1.0);
        state.ball.pos = paddle.center;
        move_ball(&mut state, 0.0);
        assert_eq!(state.ball.vel, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_clear_level_breather_then_next() {
        let mut state = new_state();
        state.ball.stuck = false;
        state.phase = GamePhase::Playing;
        state.bricks = BrickList::default();
        state.non_solid_remaining = 0;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Breather);

        let steps = (BREATHER_SECS / SIM_DT).ceil() as usize + 2;
        for _ in 0..steps {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Serve);
        assert_eq!(state.level_index, 1);
        assert!(state.non_solid_remaining > 0);
        assert_eq!(
            state.non_solid_remaining as usize,
            state.bricks.non_solid_count()
        );
    }

    #[test]
    fn test_determinism() {
        let mut state1 = new_state();
        let mut state2 = new_state();

        let inputs = [
            press(|i| i.right = true),
            press(|i| i.launch = true),
            press(|i| i.left = true),
            TickInput::default(),
        ];

        for _ in 0..200 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.ball.pos, state2.ball.pos);
        assert_eq!(state1.bricks.len(), state2.bricks.len());
        assert_eq!(state1.paddle.bounds.center, state2.paddle.bounds.center);
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_in_bounds(
            holds in prop::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..0.5), 1..100),
            width in 200.0f32..2000.0,
        ) {
            let mut state = GameState::new(width, 600.0, 1, Tuning::default());
            let half = state.paddle.bounds.half.x;
            for (left, right, dt) in holds {
                move_paddle(&mut state, left, right, dt);
                let x = state.paddle.bounds.center.x;
                prop_assert!(x >= half - 1e-3 && x <= width - half + 1e-3);
            }
        }
    }
}
