use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::direction::Direction;
use crate::error::Result;
use crate::maze::{Maze, Pos};

/// Builds a maze with the growing-tree algorithm, then braids dead ends.
pub fn generate(
    height: usize,
    width: usize,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Result<Maze> {
    let mut maze = Maze::new(height, width)?;
    let start = Pos::new(rng.gen_range(0..width), rng.gen_range(0..height));
    maze.set_origin(start);
    grow_tree(&mut maze, start, config, rng)?;
    let braided = braid(&mut maze, config.braiding_factor, rng)?;
    debug!(
        height,
        width,
        origin = ?start,
        braided,
        dead_ends = maze.dead_ends(),
        "generated maze"
    );
    Ok(maze)
}

fn grow_tree(
    maze: &mut Maze,
    start: Pos,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Result<()> {
    maze.cell_mut(start)?.set_visited(true);
    let mut active = vec![start];

    while !active.is_empty() {
        let idx = pick_index(active.len(), config, rng);
        let current = active[idx];

        let unvisited = unvisited_neighbors(maze, current);
        let Some(&(dir, next)) = unvisited.choose(rng) else {
            active.remove(idx);
            continue;
        };

        maze.cell_mut(next)?.set_visited(true);
        maze.set_wall(current, dir, false)?;
        active.push(next);
    }
    Ok(())
}

fn pick_index(len: usize, config: &GeneratorConfig, rng: &mut impl Rng) -> usize {
    let roll: f64 = rng.gen();
    if roll > config.newest_above {
        len - 1
    } else if roll > config.middle_above {
        len / 2
    } else {
        rng.gen_range(0..len)
    }
}

fn unvisited_neighbors(maze: &Maze, pos: Pos) -> Vec<(Direction, Pos)> {
    Direction::ALL
        .into_iter()
        .filter_map(|dir| {
            let next = maze.neighbor(pos, dir)?;
            let visited = maze.cell(next).map(|c| c.is_visited()).unwrap_or(true);
            (!visited).then_some((dir, next))
        })
        .collect()
}

/// Knocks one interior wall out of each dead end with probability `factor`.
/// Returns how many dead ends were opened.
pub fn braid(maze: &mut Maze, factor: f64, rng: &mut impl Rng) -> Result<usize> {
    let mut braided = 0;
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let pos = Pos { x, y };
            let cell = maze.cell(pos)?;
            if !cell.is_dead_end() || rng.gen::<f64>() >= factor {
                continue;
            }
            let removable: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&dir| cell.wall(dir) && maze.neighbor(pos, dir).is_some())
                .collect();
            if let Some(&dir) = removable.choose(rng) {
                maze.set_wall(pos, dir, false)?;
                braided += 1;
            }
        }
    }
    Ok(braided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinder::Pathfinder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(braiding_factor: f64) -> GeneratorConfig {
        GeneratorConfig {
            braiding_factor,
            ..GeneratorConfig::default()
        }
    }

    fn assert_walls_symmetric(maze: &Maze) {
        for cell in maze.cells() {
            for dir in Direction::ALL {
                if let Some(next) = maze.neighbor(cell.pos(), dir) {
                    let facing = maze.cell(next).unwrap().wall(dir.opposite());
                    assert_eq!(cell.wall(dir), facing, "{:?} {:?}", cell.pos(), dir);
                }
            }
        }
    }

    fn assert_connected(maze: &Maze) {
        let paths = Pathfinder::new(maze);
        for cell in maze.cells() {
            let dist = paths.shortest_path_length(maze.origin(), cell.pos()).unwrap();
            assert!(dist.is_some(), "{:?} unreachable", cell.pos());
        }
    }

    #[test]
    fn tree_without_braiding_is_spanning() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = generate(12, 9, &config(0.0), &mut rng).unwrap();
        assert_connected(&maze);
        assert_walls_symmetric(&maze);

        // A spanning tree over n cells has n - 1 passages.
        let open_sides: usize = maze.cells().map(|c| 4 - c.solid_walls()).sum();
        assert_eq!(open_sides / 2, 12 * 9 - 1);
        assert!(maze.cells().all(|c| c.is_visited()));
    }

    #[test]
    fn braided_maze_stays_connected_and_symmetric() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(15, 15, &GeneratorConfig::default(), &mut rng).unwrap();
            assert_connected(&maze);
            assert_walls_symmetric(&maze);
        }
    }

    #[test]
    fn boundary_walls_stay_solid() {
        let mut rng = StdRng::seed_from_u64(99);
        let maze = generate(10, 13, &config(1.0), &mut rng).unwrap();
        for cell in maze.cells() {
            for dir in Direction::ALL {
                if maze.neighbor(cell.pos(), dir).is_none() {
                    assert!(cell.wall(dir));
                }
            }
        }
    }

    #[test]
    fn full_braiding_removes_every_removable_dead_end() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(15, 15, &config(1.0), &mut rng).unwrap();
            for cell in maze.cells() {
                if !cell.is_dead_end() {
                    continue;
                }
                let interior_solid = Direction::ALL
                    .into_iter()
                    .any(|d| cell.wall(d) && maze.neighbor(cell.pos(), d).is_some());
                assert!(!interior_solid, "{:?} kept a removable dead end", cell.pos());
            }
        }
    }

    #[test]
    fn braiding_reduces_dead_ends() {
        let mut rng = StdRng::seed_from_u64(3);
        let tree = generate(15, 15, &config(0.0), &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let braided = generate(15, 15, &config(1.0), &mut rng).unwrap();
        assert!(braided.dead_ends() < tree.dead_ends());
    }

    #[test]
    fn single_cell_maze() {
        let mut rng = StdRng::seed_from_u64(1);
        let maze = generate(1, 1, &GeneratorConfig::default(), &mut rng).unwrap();
        assert_eq!(maze.cell(Pos::new(0, 0)).unwrap().solid_walls(), 4);
    }

    #[test]
    fn pick_index_follows_thresholds() {
        let newest = GeneratorConfig {
            newest_above: -1.0,
            ..GeneratorConfig::default()
        };
        let middle = GeneratorConfig {
            newest_above: 2.0,
            middle_above: -1.0,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(pick_index(9, &newest, &mut rng), 8);
            assert_eq!(pick_index(9, &middle, &mut rng), 4);
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let cfg = GeneratorConfig::default();
        let a = generate(15, 15, &cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(15, 15, &cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = generate(15, 15, &cfg, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
