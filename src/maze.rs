use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Clone, Copy, PartialEq)]
pub enum Tile {
    Wall,
    Open,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Bounds-checked 2D store of wall/open tags. All carving and searching
/// happens through the free functions below.
#[derive(Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![Tile::Wall; width]; height],
        }
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        self.tiles[pos.y][pos.x] == Tile::Open
    }

    pub fn open(&mut self, pos: Pos) {
        self.tiles[pos.y][pos.x] = Tile::Open;
    }

    pub fn start(&self) -> Pos {
        Pos { x: 0, y: 0 }
    }

    pub fn goal(&self) -> Pos {
        Pos {
            x: self.width - 1,
            y: self.height - 1,
        }
    }
}

/// Carve a perfect maze with iterative randomized depth-first search.
///
/// Rooms sit at even coordinates; carving jumps two cells at a time and
/// opens the wall cell in between, so the open cells always form a single
/// spanning tree rooted at (0,0). Odd dimensions give full coverage.
pub fn generate(rng: &mut impl Rng, width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height);
    let start = grid.start();
    grid.open(start);
    let mut stack = vec![start];

    while let Some(&pos) = stack.last() {
        let mut rooms = Vec::new();
        for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
            let (dx, dy) = dir.delta();
            let nx = pos.x as isize + dx * 2;
            let ny = pos.y as isize + dy * 2;
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let room = Pos {
                x: nx as usize,
                y: ny as usize,
            };
            if !grid.is_open(room) {
                rooms.push(room);
            }
        }

        if let Some(&room) = rooms.choose(rng) {
            let wall = Pos {
                x: (pos.x + room.x) / 2,
                y: (pos.y + room.y) / 2,
            };
            grid.open(wall);
            grid.open(room);
            stack.push(room);
        } else {
            stack.pop();
        }
    }
    grid
}

/// Shortest path from (0,0) to the far corner by breadth-first search.
///
/// Returns `None` when the goal is unreachable; a freshly generated maze
/// always has a path, so callers treat `None` as "draw no overlay".
pub fn solve(grid: &Grid) -> Option<Vec<Pos>> {
    let start = grid.start();
    let goal = grid.goal();
    let mut prev: Vec<Vec<Option<Pos>>> = vec![vec![None; grid.width]; grid.height];
    let mut seen = vec![vec![false; grid.width]; grid.height];
    let mut q = VecDeque::new();
    seen[start.y][start.x] = true;
    q.push_back(start);

    while let Some(pos) = q.pop_front() {
        if pos == goal {
            break;
        }
        for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
            let (dx, dy) = dir.delta();
            let nx = pos.x as isize + dx;
            let ny = pos.y as isize + dy;
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let next = Pos {
                x: nx as usize,
                y: ny as usize,
            };
            if seen[next.y][next.x] || !grid.is_open(next) {
                continue;
            }
            seen[next.y][next.x] = true;
            prev[next.y][next.x] = Some(pos);
            q.push_back(next);
        }
    }

    if !seen[goal.y][goal.x] || !grid.is_open(goal) {
        return None;
    }
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(p) = prev[cur.y][cur.x] {
        path.push(p);
        cur = p;
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_cells(grid: &Grid) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..grid.height {
            for x in 0..grid.width {
                if grid.is_open(Pos { x, y }) {
                    cells.push(Pos { x, y });
                }
            }
        }
        cells
    }

    fn count_adjacent_edges(grid: &Grid) -> usize {
        let mut edges = 0;
        for y in 0..grid.height {
            for x in 0..grid.width {
                if !grid.is_open(Pos { x, y }) {
                    continue;
                }
                if x + 1 < grid.width && grid.is_open(Pos { x: x + 1, y }) {
                    edges += 1;
                }
                if y + 1 < grid.height && grid.is_open(Pos { x, y: y + 1 }) {
                    edges += 1;
                }
            }
        }
        edges
    }

    fn reachable_from_start(grid: &Grid) -> usize {
        let mut seen = vec![vec![false; grid.width]; grid.height];
        let mut q = VecDeque::new();
        seen[0][0] = true;
        q.push_back(grid.start());
        let mut count = 1;
        while let Some(pos) = q.pop_front() {
            for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
                let (dx, dy) = dir.delta();
                let nx = pos.x as isize + dx;
                let ny = pos.y as isize + dy;
                if !grid.in_bounds(nx, ny) {
                    continue;
                }
                let next = Pos {
                    x: nx as usize,
                    y: ny as usize,
                };
                if seen[next.y][next.x] || !grid.is_open(next) {
                    continue;
                }
                seen[next.y][next.x] = true;
                count += 1;
                q.push_back(next);
            }
        }
        count
    }

    #[test]
    fn generated_maze_is_a_spanning_tree() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(&mut rng, 15, 15);
            let opens = open_cells(&grid);
            // Tree: connected and edge count is node count minus one.
            assert_eq!(opens.len(), count_adjacent_edges(&grid) + 1);
            assert_eq!(reachable_from_start(&grid), opens.len());
        }
    }

    #[test]
    fn start_and_goal_are_open() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generate(&mut rng, 15, 15);
        assert!(grid.is_open(grid.start()));
        assert!(grid.is_open(grid.goal()));
    }

    #[test]
    fn solved_path_runs_start_to_goal_through_open_cells() {
        let mut rng = StdRng::seed_from_u64(42);
        let grid = generate(&mut rng, 15, 15);
        let path = solve(&grid).expect("generated maze has a path");
        assert_eq!(path[0], grid.start());
        assert_eq!(*path.last().unwrap(), grid.goal());
        for pos in &path {
            assert!(grid.is_open(*pos));
        }
        for pair in path.windows(2) {
            let dx = pair[0].x.abs_diff(pair[1].x);
            let dy = pair[0].y.abs_diff(pair[1].y);
            assert_eq!(dx + dy, 1);
        }
    }

    #[test]
    fn repeated_solves_agree_on_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = generate(&mut rng, 15, 15);
        let first = solve(&grid).unwrap().len();
        for _ in 0..5 {
            assert_eq!(solve(&grid).unwrap().len(), first);
        }
    }

    #[test]
    fn unreachable_goal_yields_no_path() {
        let mut grid = Grid::new(3, 3);
        grid.open(Pos { x: 0, y: 0 });
        grid.open(Pos { x: 1, y: 0 });
        assert!(solve(&grid).is_none());
    }

    #[test]
    fn single_cell_grid_solves_trivially() {
        let mut grid = Grid::new(1, 1);
        grid.open(Pos { x: 0, y: 0 });
        let path = solve(&grid).unwrap();
        assert_eq!(path, vec![Pos { x: 0, y: 0 }]);
    }

    #[test]
    fn three_by_three_seeded_end_to_end() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(&mut rng, 3, 3);
        assert!(grid.is_open(Pos { x: 0, y: 0 }));
        assert!(grid.is_open(Pos { x: 2, y: 2 }));
        let path = solve(&grid).expect("3x3 maze is solvable");
        // Corner to corner needs at least four moves.
        assert!(path.len() >= 5);
    }

    #[test]
    fn generations_vary_across_seeds() {
        let grid_a = generate(&mut StdRng::seed_from_u64(100), 15, 15);
        let grid_b = generate(&mut StdRng::seed_from_u64(101), 15, 15);
        let differs = (0..15).any(|y| {
            (0..15).any(|x| grid_a.is_open(Pos { x, y }) != grid_b.is_open(Pos { x, y }))
        });
        assert!(differs);
    }
}
