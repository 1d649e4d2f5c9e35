use rotor_dns_domain::rotation::{rotate, GROUP_SEPARATOR, LIST_SEPARATOR};
use rotor_dns_domain::{RotationGroup, RotationPolicy, RoundRobinList};

fn rng() -> fastrand::Rng {
    fastrand::Rng::with_seed(0x5eed)
}

// ── parsing ───────────────────────────────────────────────────────────────

#[test]
fn test_parse_static_literal() {
    let policy = RotationPolicy::parse("10.0.0.1").unwrap();
    assert_eq!(policy, RotationPolicy::Static("10.0.0.1".to_string()));
    assert!(policy.is_static());
}

#[test]
fn test_parse_round_robin_list() {
    let policy = RotationPolicy::parse("10.0.0.1/10.0.0.2/10.0.0.3").unwrap();
    match policy {
        RotationPolicy::RoundRobin(list) => {
            assert_eq!(list.len(), 3);
            assert_eq!(list.head(), "10.0.0.1");
        }
        other => panic!("expected round-robin, got {:?}", other),
    }
}

#[test]
fn test_parse_groups_with_nested_list() {
    let policy = RotationPolicy::parse("10.0.0.1/10.0.0.2%10.0.0.3").unwrap();
    match policy {
        RotationPolicy::Grouped(groups) => {
            assert_eq!(groups.len(), 2);
            assert!(matches!(&groups[0], RotationGroup::List(l) if l.len() == 2));
            assert_eq!(groups[1], RotationGroup::Literal("10.0.0.3".to_string()));
        }
        other => panic!("expected groups, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_empty_elements() {
    assert!(RotationPolicy::parse("10.0.0.1//10.0.0.2").is_err());
    assert!(RotationPolicy::parse("/10.0.0.1").is_err());
    assert!(RotationPolicy::parse("10.0.0.1%").is_err());
    assert!(RotationPolicy::parse("%").is_err());
    assert!(RotationPolicy::parse("a/%b").is_err());
}

#[test]
fn test_parse_lenient_falls_back_to_static() {
    let policy = RotationPolicy::parse_lenient("10.0.0.1%%10.0.0.2");
    assert_eq!(
        policy,
        RotationPolicy::Static("10.0.0.1%%10.0.0.2".to_string())
    );
}

#[test]
fn test_encode_preserves_wire_grammar() {
    for value in [
        "10.0.0.1",
        "a/b/c",
        "a%b%c",
        "a/b%c%d/e/f",
        "target.example.com.",
    ] {
        assert_eq!(RotationPolicy::parse(value).unwrap().encode(), value);
    }
}

#[test]
fn test_separators_are_reserved_characters() {
    assert_eq!(LIST_SEPARATOR, '/');
    assert_eq!(GROUP_SEPARATOR, '%');
}

#[test]
fn test_round_robin_list_rejects_empty() {
    assert!(RoundRobinList::new(vec![]).is_err());
    assert!(RoundRobinList::new(vec!["a".into(), "".into()]).is_err());
}

// ── static ────────────────────────────────────────────────────────────────

#[test]
fn test_static_value_never_changes() {
    let mut rng = rng();
    for _ in 0..20 {
        let plan = rotate("10.0.0.1", &mut rng);
        assert_eq!(plan.selected, "10.0.0.1");
        assert!(plan.new_value.is_none());
        assert!(!plan.mutates());
    }
}

// ── round-robin ───────────────────────────────────────────────────────────

#[test]
fn test_round_robin_scenario_two_steps() {
    let mut rng = rng();

    let first = rotate("10.0.0.1/10.0.0.2/10.0.0.3", &mut rng);
    assert_eq!(first.selected, "10.0.0.1");
    assert_eq!(
        first.new_value.as_deref(),
        Some("10.0.0.2/10.0.0.3/10.0.0.1")
    );

    let second = rotate(first.new_value.as_deref().unwrap(), &mut rng);
    assert_eq!(second.selected, "10.0.0.2");
    assert_eq!(
        second.new_value.as_deref(),
        Some("10.0.0.3/10.0.0.1/10.0.0.2")
    );
}

#[test]
fn test_round_robin_completes_cycle() {
    let original = "a/b/c/d/e";
    let mut stored = original.to_string();
    let mut served = Vec::new();
    let mut rng = rng();

    for _ in 0..5 {
        let plan = rotate(&stored, &mut rng);
        served.push(plan.selected);
        stored = plan.new_value.expect("round-robin always writes back");
    }

    assert_eq!(served, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(stored, original);
}

#[test]
fn test_round_robin_rotation_preserves_elements() {
    let list = RoundRobinList::parse("x/y/z").unwrap();
    let rotated = list.rotated();

    let mut before = list.items().to_vec();
    let mut after = rotated.items().to_vec();
    before.sort();
    after.sort();

    assert_eq!(before, after);
    assert_eq!(rotated.head(), "y");
}

// ── grouped ───────────────────────────────────────────────────────────────

#[test]
fn test_static_groups_never_write_back() {
    let mut rng = rng();
    for _ in 0..200 {
        let plan = rotate("10.0.0.1%10.0.0.2", &mut rng);
        assert!(plan.selected == "10.0.0.1" || plan.selected == "10.0.0.2");
        assert!(plan.new_value.is_none());
    }
}

#[test]
fn test_group_selection_is_uniform_over_group_count() {
    let mut rng = rng();
    let mut counts = [0usize; 4];
    let value = "a%bbbbbbbbbbbbbbbb%c%dd";
    let runs = 8_000;

    for _ in 0..runs {
        let plan = rotate(value, &mut rng);
        let idx = match plan.selected.as_str() {
            "a" => 0,
            "bbbbbbbbbbbbbbbb" => 1,
            "c" => 2,
            "dd" => 3,
            other => panic!("unexpected selection {}", other),
        };
        counts[idx] += 1;
    }

    for count in counts {
        let freq = count as f64 / runs as f64;
        assert!(
            (0.20..=0.30).contains(&freq),
            "group frequency {} too far from 1/4",
            freq
        );
    }
}

#[test]
fn test_nested_list_rotates_only_when_drawn() {
    let mut rng = rng();
    let mut stored = "10.0.0.1/10.0.0.2%10.0.0.3".to_string();
    let mut list_hits = Vec::new();

    for _ in 0..100 {
        let plan = rotate(&stored, &mut rng);
        match plan.new_value {
            Some(next) => {
                list_hits.push(plan.selected.clone());
                assert!(next.ends_with("%10.0.0.3"), "suffix group must be untouched");
                stored = next;
            }
            None => assert_eq!(plan.selected, "10.0.0.3"),
        }
    }

    assert!(!list_hits.is_empty());
    for (i, hit) in list_hits.iter().enumerate() {
        let expected = if i % 2 == 0 { "10.0.0.1" } else { "10.0.0.2" };
        assert_eq!(hit, expected);
    }
}

#[test]
fn test_nested_list_is_spliced_back_in_place() {
    let policy = RotationPolicy::parse("x%a/b/c%y").unwrap();
    let mut rng = rng();

    let plan = loop {
        let plan = policy.select(&mut rng);
        if plan.mutates() {
            break plan;
        }
    };

    assert_eq!(plan.selected, "a");
    assert_eq!(plan.new_value.as_deref(), Some("x%b/c/a%y"));
}

#[test]
fn test_single_element_groups_reduce_to_random_choice() {
    let mut rng = rng();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        seen.insert(rotate("a%b%c", &mut rng).selected);
    }
    assert_eq!(seen.len(), 3);
}
