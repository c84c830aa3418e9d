use rand::Rng;
use std::time::{Duration, Instant};

use crate::maze::{generate, solve, Dir, Grid, Pos};

const AUTO_RETURN: Duration = Duration::from_secs(5);
const NOTICE_TIME: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Menu,
    Generate,
    Play,
    Solution,
    Won,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Generate,
    Play,
    Solution,
    Move(Dir),
}

struct Notice {
    text: &'static str,
    until: Instant,
}

/// Interaction state for one maze session.
///
/// The maze is generated and solved once per `Generate` command; every
/// other command only moves the player or switches modes. Notices are
/// timed overlays, never blocking waits. Winning enters `Won`, where any
/// further command drops back to the menu.
pub struct Session {
    pub mode: Mode,
    pub grid: Option<Grid>,
    pub path: Option<Vec<Pos>>,
    pub player: Pos,
    width: usize,
    height: usize,
    entered: Instant,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(width: usize, height: usize, now: Instant) -> Self {
        Self {
            mode: Mode::Menu,
            grid: None,
            path: None,
            player: Pos { x: 0, y: 0 },
            width,
            height,
            entered: now,
            notice: None,
        }
    }

    pub fn apply(&mut self, cmd: Command, rng: &mut impl Rng, now: Instant) {
        if self.mode == Mode::Won {
            self.mode = Mode::Menu;
            return;
        }
        match cmd {
            Command::Generate => {
                let grid = generate(rng, self.width, self.height);
                self.path = solve(&grid);
                self.grid = Some(grid);
                self.player = Pos { x: 0, y: 0 };
                self.entered = now;
                self.mode = Mode::Generate;
            }
            Command::Play => {
                if self.grid.is_some() {
                    self.mode = Mode::Play;
                } else {
                    self.show_notice("Generate a maze first", now);
                }
            }
            Command::Solution => {
                if self.grid.is_some() {
                    self.entered = now;
                    self.mode = Mode::Solution;
                } else {
                    self.show_notice("Generate a maze first", now);
                }
            }
            Command::Move(dir) => self.move_player(dir, now),
        }
    }

    fn move_player(&mut self, dir: Dir, now: Instant) {
        if self.mode != Mode::Play {
            return;
        }
        let grid = match &self.grid {
            Some(grid) => grid,
            None => return,
        };
        let (dx, dy) = dir.delta();
        let nx = self.player.x as isize + dx;
        let ny = self.player.y as isize + dy;
        if !grid.in_bounds(nx, ny) {
            return;
        }
        let next = Pos {
            x: nx as usize,
            y: ny as usize,
        };
        if !grid.is_open(next) {
            return;
        }
        self.player = next;
        if self.player == grid.goal() {
            self.show_notice("YOU WIN!", now);
            self.mode = Mode::Won;
        }
    }

    /// Per-frame housekeeping: expire the notice and fall back to the menu
    /// after five seconds of passive display.
    pub fn tick(&mut self, now: Instant) {
        if let Some(notice) = &self.notice {
            if now >= notice.until {
                self.notice = None;
            }
        }
        if matches!(self.mode, Mode::Generate | Mode::Solution)
            && now.duration_since(self.entered) > AUTO_RETURN
        {
            self.mode = Mode::Menu;
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice.as_ref().map(|n| n.text)
    }

    fn show_notice(&mut self, text: &'static str, now: Instant) {
        self.notice = Some(Notice {
            text,
            until: now + NOTICE_TIME,
        });
    }
}
