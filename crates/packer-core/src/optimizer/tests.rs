use super::evolution::{Evaluator, GeneticOperators, Scored, StandardOperators};
use super::fitness::{cost, score};
use super::placement::{pack, pack_with_preset_rotations};
use super::*;
use crate::config::FitnessPolicy;
use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

fn single_bin(width: u32, height: u32) -> Vec<Bin> {
    vec![Bin::new(1, width, height)]
}

fn small_search() -> SearchConfig {
    SearchConfig::default()
        .with_population_size(20)
        .with_generations(10)
        .with_seed(7)
}

fn is_permutation(order: &[usize]) -> bool {
    let mut sorted = order.to_vec();
    sorted.sort_unstable();
    sorted == (0..order.len()).collect::<Vec<_>>()
}

#[test]
fn test_exact_fit_places_both_items() {
    let items = vec![Item::rectangle("a", 4, 4), Item::rectangle("b", 6, 6)];
    let result = pack(&items, &single_bin(10, 10));

    assert!(result.unplaced.is_empty());
    let placements = &result.layouts[0].placements;
    assert_eq!(placements.len(), 2);
    assert_eq!((placements[0].x, placements[0].y), (0, 0));
    assert_eq!((placements[1].x, placements[1].y), (4, 0));
    assert_eq!(result.wastage(), 48.0);
}

#[test]
fn test_tessellated_pair_counts_shared_box_once() {
    let items = vec![
        Item::triangle("t0", 4, 4).rotatable(true),
        Item::triangle("t1", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg180),
    ];
    let result = pack_with_preset_rotations(&items, &single_bin(8, 4));

    let layout = &result.layouts[0];
    let boxes: u32 = layout.placements.iter().map(|p| p.width() * p.height()).sum();
    assert_eq!(boxes, 32);

    // Both triangles sit in one 4x4 box, so only 16 of the bin's 32 is covered
    assert_eq!(result.occupied_area(), 16.0);
    assert_eq!(result.wastage(), 16.0);
    assert!((cost(&result, &FitnessPolicy::default()) - 0.16).abs() < 1e-9);
}

#[test]
fn test_scan_is_row_major() {
    let items = vec![
        Item::rectangle("wide", 8, 3),
        Item::rectangle("small", 3, 3),
    ];
    let result = pack(&items, &single_bin(10, 10));

    // Nothing fits to the right of the wide piece, so the next row starts right above it
    let small = &result.layouts[0].placements[1];
    assert_eq!((small.x, small.y), (0, 3));
}

#[test]
fn test_item_moves_on_to_next_bin() {
    let bins = vec![Bin::new(1, 2, 2), Bin::new(2, 5, 5)];
    let result = pack(&[Item::rectangle("big", 3, 3)], &bins);

    assert!(result.layouts[0].placements.is_empty());
    assert_eq!(result.layouts[1].placements.len(), 1);
    assert!(result.unplaced.is_empty());
}

#[test]
fn test_overflow_goes_to_unplaced_without_aborting() {
    let items = vec![
        Item::rectangle("first", 10, 10),
        Item::rectangle("second", 1, 1),
        Item::rectangle("third", 1, 1),
    ];
    let result = pack(&items, &single_bin(10, 10));

    assert_eq!(result.placed_count(), 1);
    let unplaced: Vec<&str> = result.unplaced.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(unplaced, vec!["second", "third"]);
}

#[test]
fn test_triangles_tessellate_in_one_box() {
    let items = vec![
        Item::triangle("t0", 4, 4).rotatable(true),
        Item::triangle("t1", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg180),
        Item::triangle("t2", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg90),
    ];
    let result = pack_with_preset_rotations(&items, &single_bin(4, 4));

    let placements = &result.layouts[0].placements;
    assert_eq!(placements.len(), 2);
    assert!(placements.iter().all(|p| (p.x, p.y) == (0, 0)));
    assert_eq!(result.unplaced.len(), 1);
    assert_eq!(result.unplaced[0].id, "t2");
    assert_eq!(result.wastage(), 0.0);
}

#[test]
fn test_full_tessellation_slot_rejects_third_triangle() {
    let items = vec![
        Item::triangle("t0", 4, 4).rotatable(true),
        Item::triangle("t1", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg180),
        Item::triangle("t2", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg180),
    ];
    let result = pack_with_preset_rotations(&items, &single_bin(8, 4));

    let third = &result.layouts[0].placements[2];
    assert_eq!(third.id(), "t2");
    assert_eq!((third.x, third.y), (4, 0));
}

#[test]
fn test_non_complementary_triangle_is_tried_elsewhere() {
    let items = vec![
        Item::triangle("t0", 4, 4).rotatable(true),
        Item::triangle("t1", 4, 4)
            .rotatable(true)
            .with_rotation(Rotation::Deg90),
    ];
    let result = pack_with_preset_rotations(&items, &single_bin(8, 4));

    let second = &result.layouts[0].placements[1];
    assert_eq!((second.x, second.y), (4, 0));
}

#[test]
fn test_triangle_slot_ahead_is_not_skipped() {
    let resident = PlacedItem {
        item: Item::triangle("t0", 4, 4).rotatable(true),
        x: 3,
        y: 0,
    };
    let layout = BinLayout {
        bin: Bin::new(1, 7, 4),
        placements: vec![resident],
    };

    let partner = Item::triangle("t1", 4, 4)
        .rotatable(true)
        .with_rotation(Rotation::Deg180);
    assert_eq!(placement::find_first_position(&partner, &layout), Some((3, 0)));

    let stranger = Item::triangle("t2", 4, 4).rotatable(true);
    assert_eq!(placement::find_first_position(&stranger, &layout), None);
}

#[test]
fn test_forced_rotation_fallback() {
    let item = Item::rectangle("long", 10, 3).rotatable(true);
    let result = pack(&[item.clone()], &single_bin(3, 12));

    let placed = &result.layouts[0].placements[0];
    assert_eq!((placed.x, placed.y), (0, 0));
    assert_eq!(placed.item.rotation, Rotation::Deg90);
    assert_eq!((placed.width(), placed.height()), (3, 10));

    // Preset rotations never fall back
    let preset = pack_with_preset_rotations(&[item], &single_bin(3, 12));
    assert_eq!(preset.unplaced.len(), 1);
}

#[test]
fn test_triangle_fallback_tries_remaining_turns() {
    let item = Item::triangle("t", 4, 2).rotatable(true);
    let result = pack(&[item], &single_bin(2, 4));

    let placed = &result.layouts[0].placements[0];
    assert_eq!(placed.item.rotation, Rotation::Deg90);
}

#[test]
fn test_square_rectangle_has_no_fallback() {
    let item = Item::rectangle("sq", 5, 5).rotatable(true);
    let result = pack(&[item], &single_bin(4, 10));
    assert_eq!(result.unplaced.len(), 1);
}

#[test]
fn test_fixed_items_never_rotate() {
    let item = Item::rectangle("fixed", 3, 10).with_rotation(Rotation::Deg90);
    let result = pack_with_preset_rotations(&[item], &single_bin(3, 12));

    let placed = &result.layouts[0].placements[0];
    assert_eq!(placed.item.rotation, Rotation::Deg0);
    assert_eq!((placed.width(), placed.height()), (3, 10));
}

#[test]
fn test_pack_is_deterministic() {
    let items: Vec<Item> = (0..12)
        .map(|i| Item::rectangle(format!("r{i}"), 2 + i % 3, 1 + i % 4).rotatable(i % 2 == 0))
        .collect();
    let bins = vec![Bin::new(1, 7, 5), Bin::new(2, 6, 6)];

    assert_eq!(pack(&items, &bins), pack(&items, &bins));
}

#[test]
fn test_area_by_shape() {
    assert_eq!(Item::rectangle("r", 4, 3).area(), 12.0);
    assert_eq!(Item::triangle("t", 4, 3).area(), 6.0);
    let circle = Item::circle("c", 6, 4).area();
    assert!((circle - std::f64::consts::PI * 4.0).abs() < 1e-9);
}

#[test]
fn test_unpacked_area_dominates_value() {
    let bins = single_bin(10, 10);
    let x = Item::rectangle("X", 6, 4).rotatable(true).priced(5.0);
    let y = Item::rectangle("Y", 5, 5).priced(10.0);
    let z = Item::rectangle("Z", 8, 8).priced(3.0);

    // X and Y share the bin, Z is left out (64 area unpacked)
    let without_z = pack(&[x.clone(), y.clone(), z.clone()], &bins);
    assert_eq!(without_z.unplaced.len(), 1);
    assert_eq!(without_z.unplaced[0].id, "Z");

    // Z alone fills most of the bin, X and Y are left out (49 area unpacked)
    let without_xy = pack(&[z, x, y], &bins);
    assert_eq!(without_xy.unplaced.len(), 2);

    let policy = FitnessPolicy::default();
    assert!((cost(&without_z, &policy) - 64.81).abs() < 1e-9);
    assert!((cost(&without_xy, &policy) - 50.86).abs() < 1e-9);
    assert!(score(&without_xy, &policy) > score(&without_z, &policy));
}

#[test]
fn test_unpacked_value_breaks_area_ties() {
    let bins = single_bin(4, 4);
    let cheap = Item::rectangle("cheap", 4, 4).priced(1.0);
    let dear = Item::rectangle("dear", 4, 4).priced(50.0);

    let keeps_dear = pack(&[dear.clone(), cheap.clone()], &bins);
    let keeps_cheap = pack(&[cheap, dear], &bins);

    let policy = FitnessPolicy::default();
    assert!(score(&keeps_dear, &policy) > score(&keeps_cheap, &policy));
}

#[test]
fn test_score_bounds() {
    let full = pack(&[Item::rectangle("all", 5, 5)], &single_bin(5, 5));
    assert_eq!(score(&full, &FitnessPolicy::default()), 1.0);

    let nothing = pack(&[Item::rectangle("huge", 9, 9)], &single_bin(5, 5));
    let s = score(&nothing, &FitnessPolicy::default());
    assert!(s > 0.0 && s < 1.0);
}

#[test]
fn test_wastage_penalty_policy() {
    let result = pack(
        &[Item::rectangle("a", 2, 2), Item::rectangle("b", 9, 9)],
        &single_bin(4, 4),
    );
    let policy = FitnessPolicy::WastagePenalty {
        unplaced_penalty: 100.0,
    };
    assert_eq!(cost(&result, &policy), 12.0 + 100.0);
}

#[test]
fn test_decode_reduces_rotation_genes() {
    let items = vec![
        Item::rectangle("a", 2, 3).rotatable(true),
        Item::rectangle("b", 2, 3),
    ];
    let codec = Codec::new(&items);
    let genotype = Genotype::new(vec![1, 0], vec![5, 7]).unwrap();

    let decoded = codec.decode(&genotype).unwrap();
    assert_eq!(decoded[0].id, "b");
    assert_eq!(decoded[0].rotation, Rotation::Deg0);
    assert_eq!(decoded[1].id, "a");
    assert_eq!(decoded[1].rotation, Rotation::Deg270);
}

#[test]
fn test_flat_genes_split_into_order_and_rotations() {
    let genotype = Genotype::from_genes(&[1, 0, 2, 3]).unwrap();
    assert_eq!(genotype.order(), &[1, 0]);
    assert_eq!(genotype.rotations(), &[2, 3]);
    assert_eq!(genotype.genes(), vec![1, 0, 2, 3]);

    assert!(Genotype::from_genes(&[0, 1, 2]).is_err());
}

#[test]
fn test_malformed_genotypes_are_rejected() {
    assert!(matches!(
        Genotype::new(vec![0, 0], vec![0, 0]),
        Err(PackerError::MalformedGenotype(_))
    ));
    assert!(matches!(
        Genotype::new(vec![0, 2], vec![0, 0]),
        Err(PackerError::MalformedGenotype(_))
    ));

    let items = vec![Item::rectangle("a", 1, 1), Item::rectangle("b", 1, 1)];
    let short = Genotype::new(vec![0], vec![0]).unwrap();
    assert!(Codec::new(&items).decode(&short).is_err());
}

#[test]
fn test_encode_matches_decode() {
    let items = vec![
        Item::triangle("t", 4, 4).rotatable(true),
        Item::rectangle("r", 2, 3).rotatable(true),
        Item::circle("c", 2, 2),
    ];
    let codec = Codec::new(&items);
    let sequence = vec![
        items[2].clone(),
        items[0].with_rotation(Rotation::Deg180),
        items[1].with_rotation(Rotation::Deg90),
    ];

    let genotype = codec.encode(&sequence).unwrap();
    assert_eq!(genotype.order(), &[2, 0, 1]);
    assert_eq!(codec.decode(&genotype).unwrap(), sequence);

    let duplicated = vec![items[0].clone(), items[0].clone(), items[1].clone()];
    assert!(codec.encode(&duplicated).is_err());
}

#[test]
fn test_crossover_and_mutation_keep_permutations() {
    let mut rng = SmallRng::seed_from_u64(42);
    let operators = StandardOperators::new(3);

    for _ in 0..200 {
        let first = Genotype::random(9, &mut rng);
        let second = Genotype::random(9, &mut rng);

        let mut child = operators.crossover(&first, &second, &mut rng);
        assert!(is_permutation(child.order()));
        assert_eq!(child.rotations().len(), 9);

        operators.mutate(&mut child, &mut rng);
        assert!(is_permutation(child.order()));
        assert!(child.rotations().iter().all(|gene| *gene < 4));
    }
}

#[test]
fn test_full_tournament_picks_fittest() {
    let mut rng = SmallRng::seed_from_u64(3);
    let population: Vec<Scored> = [0.2, 0.9, 0.5, 0.1]
        .into_iter()
        .map(|fitness| Scored {
            genotype: Genotype::random(3, &mut rng),
            fitness,
        })
        .collect();

    let operators = StandardOperators::new(population.len());
    for _ in 0..10 {
        assert_eq!(operators.select(&population, &mut rng).fitness, 0.9);
    }
}

#[test]
fn test_tournament_ties_go_to_first_sampled() {
    let mut rng = SmallRng::seed_from_u64(9);
    let population: Vec<Scored> = (0..6)
        .map(|i| Scored {
            genotype: Genotype::random(3, &mut rng),
            fitness: if i == 0 { 0.1 } else { 0.5 },
        })
        .collect();

    let operators = StandardOperators::new(population.len());
    for _ in 0..20 {
        let mut replay = rng.clone();
        let first_best = index::sample(&mut replay, population.len(), population.len())
            .iter()
            .find(|&i| population[i].fitness == 0.5)
            .unwrap();

        let winner = operators.select(&population, &mut rng);
        assert!(std::ptr::eq(winner, &population[first_best]));
    }
}

/// Operators whose crossover breaks the permutation.
struct DuplicatingOperators(StandardOperators);

impl GeneticOperators for DuplicatingOperators {
    fn select<'p, R: Rng>(&self, population: &'p [Scored], rng: &mut R) -> &'p Scored {
        self.0.select(population, rng)
    }

    fn crossover<R: Rng>(&self, first: &Genotype, _second: &Genotype, _rng: &mut R) -> Genotype {
        Genotype {
            order: vec![0; first.len()],
            rotations: first.rotations.clone(),
        }
    }

    fn mutate<R: Rng>(&self, genotype: &mut Genotype, rng: &mut R) {
        self.0.mutate(genotype, rng)
    }
}

#[test]
fn test_evaluator_rejects_genotype_of_wrong_length() {
    let items = vec![Item::rectangle("a", 2, 2), Item::rectangle("b", 3, 3)];
    let bins = single_bin(5, 5);
    let evaluator = Evaluator::new(Codec::new(&items), &bins, FitnessPolicy::default());

    let short = Genotype::new(vec![0], vec![0]).unwrap();
    assert!(matches!(
        evaluator.pack(&short),
        Err(PackerError::MalformedGenotype(_))
    ));
    assert!(evaluator.evaluate(&short).is_err());

    let full = Genotype::new(vec![1, 0], vec![0, 0]).unwrap();
    let result = evaluator.pack(&full).unwrap();
    assert_eq!(result.placed_count(), 2);
}

#[test]
fn test_malformed_offspring_never_reach_the_result() {
    let items = vec![
        Item::rectangle("a", 2, 2),
        Item::rectangle("b", 3, 3),
        Item::rectangle("c", 1, 4),
    ];
    let config = small_search().with_crossover_rate(1.0);
    let optimizer = Optimizer::new(items, single_bin(5, 5), config).unwrap();

    let outcome = optimizer.search_with(DuplicatingOperators(StandardOperators::new(3)));

    let mut ids: Vec<&str> = outcome
        .result
        .placements()
        .map(|p| p.id())
        .chain(outcome.result.unplaced.iter().map(|i| i.id.as_str()))
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(outcome.generations, 10);
}

#[test]
fn test_tally_by_shape() {
    let items = vec![
        Item::rectangle("a", 10, 3).priced(10.0),
        Item::rectangle("b", 8, 2).priced(7.5),
        Item::triangle("t", 4, 4).priced(3.0),
    ];
    let tallies = tally_by_shape(&items);

    assert_eq!(tallies.len(), 2);
    assert_eq!(
        tallies[&Shape::Rectangle],
        ShapeTally {
            count: 2,
            value: 17.5
        }
    );
    assert_eq!(tallies[&Shape::Triangle].count, 1);
    assert!(!tallies.contains_key(&Shape::Circle));
}

#[test]
fn test_rejects_empty_bin_catalog() {
    let result = Optimizer::new(
        vec![Item::rectangle("a", 1, 1)],
        vec![],
        SearchConfig::default(),
    );
    assert!(matches!(result, Err(PackerError::NoBins)));
}

#[test]
fn test_rejects_item_larger_than_every_bin() {
    let bins = vec![Bin::new(1, 10, 10), Bin::new(2, 8, 12)];
    let result = Optimizer::new(
        vec![Item::rectangle("slab", 13, 13)],
        bins.clone(),
        SearchConfig::default(),
    );
    assert!(matches!(result, Err(PackerError::OversizedItem { .. })));

    // Too long in one direction only is an ordinary unplaceable item
    let result = Optimizer::new(
        vec![Item::rectangle("plank", 20, 2)],
        bins,
        SearchConfig::default(),
    );
    assert!(result.is_ok());

    // Too big both ways as given, but a quarter turn brings one side within the bin
    let narrow = vec![Bin::new(1, 2, 10)];
    let post = Item::rectangle("post", 3, 11);
    let result = Optimizer::new(
        vec![post.clone().rotatable(true)],
        narrow.clone(),
        SearchConfig::default(),
    );
    assert!(result.is_ok());

    let result = Optimizer::new(vec![post], narrow, SearchConfig::default());
    assert!(matches!(result, Err(PackerError::OversizedItem { .. })));
}

#[test]
fn test_rejects_invalid_items_and_knobs() {
    let bins = single_bin(10, 10);

    let duplicate = vec![Item::rectangle("a", 1, 1), Item::rectangle("a", 2, 2)];
    assert!(Optimizer::new(duplicate, bins.clone(), SearchConfig::default()).is_err());

    let flat = vec![Item::rectangle("flat", 0, 2)];
    assert!(Optimizer::new(flat, bins.clone(), SearchConfig::default()).is_err());

    let negative = vec![Item::rectangle("n", 1, 1).priced(-1.0)];
    assert!(Optimizer::new(negative, bins.clone(), SearchConfig::default()).is_err());

    let items = vec![Item::rectangle("a", 1, 1)];
    let tiny = SearchConfig::default().with_population_size(1);
    assert!(Optimizer::new(items.clone(), bins.clone(), tiny).is_err());

    let wild = SearchConfig::default().with_mutation_rate(1.5);
    assert!(Optimizer::new(items, bins, wild).is_err());
}

#[test]
fn test_zero_items_yield_empty_result() {
    let optimizer = Optimizer::new(vec![], single_bin(5, 5), small_search()).unwrap();
    let result = optimizer.run();

    assert_eq!(result.layouts.len(), 1);
    assert_eq!(result.placed_count(), 0);
    assert!(result.unplaced.is_empty());
}

#[test]
fn test_zero_area_bins_leave_everything_unplaced() {
    let items = vec![Item::rectangle("a", 1, 1), Item::rectangle("b", 2, 2)];
    let optimizer = Optimizer::new(items, vec![Bin::new(1, 0, 5)], small_search()).unwrap();
    let result = optimizer.run();

    assert_eq!(result.placed_count(), 0);
    assert_eq!(result.unplaced.len(), 2);
}

#[test]
fn test_request_expands_quantities() {
    let request = PackingRequest {
        items: vec![
            ItemSpec {
                id: "A".to_string(),
                shape: Shape::Rectangle,
                width: 2,
                height: 1,
                quantity: 3,
                can_rotate: true,
                price: 10.0,
            },
            ItemSpec {
                id: "B".to_string(),
                shape: Shape::Circle,
                width: 2,
                height: 2,
                quantity: 1,
                can_rotate: false,
                price: 4.0,
            },
        ],
        bins: single_bin(10, 10),
        search: small_search(),
    };

    let optimizer = Optimizer::from_request(request).unwrap();
    let ids: Vec<&str> = optimizer.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["A_1", "A_2", "A_3", "B"]);
}

#[test]
fn test_search_prefers_packing_more_area() {
    let items = vec![
        Item::rectangle("X", 6, 4).rotatable(true).priced(5.0),
        Item::rectangle("Y", 5, 5).priced(10.0),
        Item::rectangle("Z", 8, 8).priced(3.0),
    ];
    let optimizer = Optimizer::new(items, single_bin(10, 10), small_search()).unwrap();
    let result = optimizer.run();

    let mut unplaced: Vec<&str> = result.unplaced.iter().map(|i| i.id.as_str()).collect();
    unplaced.sort_unstable();
    assert_eq!(unplaced, vec!["X", "Y"]);
}

#[test]
fn test_seeded_search_is_reproducible() {
    let items: Vec<Item> = (0..10)
        .map(|i| Item::rectangle(format!("r{i}"), 1 + i % 4, 2 + i % 3).rotatable(true))
        .collect();
    let bins = vec![Bin::new(1, 6, 6), Bin::new(2, 5, 4)];

    let first = Optimizer::new(items.clone(), bins.clone(), small_search())
        .unwrap()
        .search();
    let second = Optimizer::new(items, bins, small_search()).unwrap().search();

    assert_eq!(first.result, second.result);
    assert_eq!(first.best_fitness, second.best_fitness);
}

#[test]
fn test_best_ever_never_regresses() {
    let items: Vec<Item> = (0..15)
        .map(|i| Item::triangle(format!("t{i}"), 3, 3).rotatable(true).priced(2.0))
        .collect();
    let optimizer = Optimizer::new(items, single_bin(9, 6), small_search()).unwrap();
    let outcome = optimizer.search();

    assert_eq!(outcome.generations, 10);
    assert_eq!(outcome.history.len(), 11);
    for pair in outcome.history.windows(2) {
        assert!(pair[1].best_ever >= pair[0].best_ever);
    }
    for stats in &outcome.history {
        assert!(stats.best <= stats.best_ever);
        assert!(stats.worst <= stats.average + 1e-12 && stats.average <= stats.best + 1e-12);
    }

    let reported = score(&outcome.result, &optimizer.config().fitness);
    assert_eq!(reported, outcome.best_fitness);
}

#[test]
fn test_cancelled_search_still_reports_best() {
    let items = vec![Item::rectangle("a", 2, 2), Item::rectangle("b", 3, 3)];
    let optimizer = Optimizer::new(items, single_bin(5, 5), small_search()).unwrap();
    optimizer
        .cancel_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let outcome = optimizer.search();
    assert!(outcome.cancelled);
    assert_eq!(outcome.generations, 0);
    assert_eq!(outcome.result.placed_count() + outcome.result.unplaced.len(), 2);
}

#[test]
fn test_evaluate_checks_genotype() {
    let items = vec![Item::rectangle("a", 2, 2), Item::rectangle("b", 3, 3)];
    let optimizer = Optimizer::new(items, single_bin(5, 5), small_search()).unwrap();

    let valid = Genotype::new(vec![1, 0], vec![0, 0]).unwrap();
    let fitness = optimizer.evaluate(&valid).unwrap();
    assert!(fitness > 0.0 && fitness <= 1.0);

    let wrong_size = Genotype::new(vec![0, 1, 2], vec![0, 0, 0]).unwrap();
    assert!(optimizer.evaluate(&wrong_size).is_err());
}

#[test]
fn test_summary_and_plan() {
    let items = vec![
        Item::triangle("t0", 2, 2).rotatable(true).priced(3.0),
        Item::triangle("t1", 2, 2)
            .rotatable(true)
            .priced(3.0)
            .with_rotation(Rotation::Deg180),
        Item::circle("c", 3, 3).priced(16.0),
    ];
    let result = pack_with_preset_rotations(&items, &single_bin(2, 2));
    let summary = result.summary();

    assert_eq!(summary.packed_items, 2);
    assert_eq!(summary.unpacked_items, 1);
    assert_eq!(summary.packed_value, 6.0);
    assert_eq!(summary.unpacked_value, 16.0);
    assert_eq!(summary.wastage, 0.0);
    assert_eq!(summary.utilization_percentage, 100.0);
    assert_eq!(summary.triangle_rotations.get(&0), Some(&1));
    assert_eq!(summary.triangle_rotations.get(&180), Some(&1));
    assert_eq!(summary.unpacked_by_shape[&Shape::Circle].count, 1);

    let plan = result.plan();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].bin_id, 1);
    assert_eq!(plan[0].items[1].rotation, 180);

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json[0]["binId"], 1);
    assert_eq!(json[0]["items"][0]["shape"], "Triangle");
}
