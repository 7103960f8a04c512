use pack_engine::*;

/// Deterministic pseudo-random corpus (LCG) so failures reproduce
fn corpus(count: usize, seed: u64) -> Vec<PackBox> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % 1000) as f64 / 1000.0
    };

    (0..count)
        .map(|i| PackBox::new(format!("img-{i:03}"), 10.0 + next() * 90.0, 10.0 + next() * 90.0))
        .collect()
}

fn draft() -> PackingOptions {
    PackingOptions::default().with_factor(PackingFactor::Draft)
}

fn assert_padded_non_overlap(layout: &PackedLayout, container: &ContainerSpec) {
    for page in &layout.pages {
        for (i, a) in page.boxes.iter().enumerate() {
            assert!(a.x >= container.margin.left - 1e-9);
            assert!(a.y >= container.margin.top - 1e-9);
            assert!(a.right() <= container.page_width() - container.margin.right + 1e-9);
            assert!(a.bottom() <= container.page_height() - container.margin.bottom + 1e-9);

            for b in &page.boxes[i + 1..] {
                let gap_x = (b.x - a.right()).max(a.x - b.right());
                let gap_y = (b.y - a.bottom()).max(a.y - b.bottom());
                assert!(
                    gap_x >= container.padding - 1e-9 || gap_y >= container.padding - 1e-9,
                    "{} and {} are closer than the padding",
                    a.box_id,
                    b.box_id
                );
            }
        }
    }
}

#[test]
fn test_three_boxes_end_to_end() {
    let boxes = vec![
        PackBox::new("A", 60.0, 40.0),
        PackBox::new("B", 60.0, 40.0),
        PackBox::new("C", 60.0, 40.0),
    ];
    let container = ContainerSpec::new(100.0, 100.0);

    for factor in PackingFactor::ALL {
        let options = PackingOptions::default().with_factor(factor);
        let layout = pack(&boxes, &container, &options).unwrap();

        assert_eq!(layout.page_count(), 2, "{factor:?}");
        assert!(layout.unplaceable.is_empty());

        let page1 = &layout.pages[0].boxes;
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].box_id, BoxId::from("A"));
        assert_eq!((page1[0].x, page1[0].y, page1[0].rotated), (0.0, 0.0, false));
        assert_eq!(page1[1].box_id, BoxId::from("B"));
        assert_eq!((page1[1].x, page1[1].y, page1[1].rotated), (0.0, 40.0, false));

        let page2 = &layout.pages[1].boxes;
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].box_id, BoxId::from("C"));
        assert_eq!((page2[0].x, page2[0].y, page2[0].rotated), (0.0, 0.0, false));
    }
}

#[test]
fn test_exact_fit_box_alone_at_margin_origin() {
    let container = ContainerSpec::new(200.0, 100.0)
        .with_margin(Margin {
            top: 10.0,
            right: 20.0,
            bottom: 30.0,
            left: 40.0,
        })
        .with_padding(5.0);
    let boxes = vec![PackBox::new("small", 10.0, 10.0), PackBox::new("full", 200.0, 100.0)];

    let layout = pack(&boxes, &container, &draft()).unwrap();

    assert_eq!(layout.page_count(), 2);
    let (page, full) = layout.find(&BoxId::from("full")).unwrap();
    assert_eq!(layout.pages[page].len(), 1);
    assert_eq!((full.x, full.y), (40.0, 10.0));
    assert!(!full.rotated);

    let (_, small) = layout.find(&BoxId::from("small")).unwrap();
    assert_eq!((small.x, small.y), (40.0, 10.0));
}

#[test]
fn test_oversized_box_is_unplaceable() {
    let container = ContainerSpec::new(200.0, 100.0);
    let boxes = vec![
        PackBox::new("huge", 300.0, 50.0),
        PackBox::new("fine", 50.0, 50.0),
        PackBox::new("giant", 250.0, 250.0),
    ];

    let layout = pack(&boxes, &container, &PackingOptions::default()).unwrap();

    assert_eq!(layout.page_count(), 1);
    assert_eq!(layout.placed_count(), 1);
    assert_eq!(
        layout.unplaceable,
        vec![BoxId::from("giant"), BoxId::from("huge")]
    );
    assert!(layout.find(&BoxId::from("huge")).is_none());
}

#[test]
fn test_rotation_rescues_tall_box() {
    let container = ContainerSpec::new(200.0, 100.0);
    let boxes = vec![PackBox::new("tall", 90.0, 150.0)];

    let layout = pack(&boxes, &container, &draft()).unwrap();
    let (_, placed) = layout.find(&BoxId::from("tall")).unwrap();
    assert!(placed.rotated);
    assert_eq!((placed.width, placed.height), (150.0, 90.0));

    let no_rotation = draft().with_rotation(false);
    let layout = pack(&boxes, &container, &no_rotation).unwrap();
    assert_eq!(layout.page_count(), 0);
    assert_eq!(layout.unplaceable, vec![BoxId::from("tall")]);
}

#[test]
fn test_padding_between_boxes() {
    let boxes: Vec<PackBox> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|id| PackBox::new(id, 45.0, 45.0))
        .collect();

    let tight = ContainerSpec::new(100.0, 100.0).with_padding(10.0);
    let layout = pack(&boxes, &tight, &draft()).unwrap();
    assert_eq!(layout.page_count(), 1);
    let page = &layout.pages[0].boxes;
    assert_eq!((page[1].x, page[1].y), (55.0, 0.0));
    assert_eq!((page[2].x, page[2].y), (0.0, 55.0));
    assert_padded_non_overlap(&layout, &tight);

    let too_wide = ContainerSpec::new(100.0, 100.0).with_padding(11.0);
    let layout = pack(&boxes, &too_wide, &draft()).unwrap();
    assert_eq!(layout.page_count(), 4);
}

#[test]
fn test_every_box_accounted_for_once() {
    let mut boxes = corpus(150, 7);
    boxes.push(PackBox::new("too-big", 500.0, 500.0));
    let container = ContainerSpec::new(300.0, 400.0)
        .with_margin(Margin::uniform(12.0))
        .with_padding(4.0);

    let layout = pack(&boxes, &container, &PackingOptions::default()).unwrap();

    let mut ids: Vec<&BoxId> = layout
        .pages
        .iter()
        .flat_map(|p| p.boxes.iter().map(|b| &b.box_id))
        .chain(layout.unplaceable.iter())
        .collect();
    ids.sort();
    let mut expected: Vec<&BoxId> = boxes.iter().map(|b| &b.id).collect();
    expected.sort();

    assert_eq!(ids, expected);
    assert_eq!(layout.unplaceable, vec![BoxId::from("too-big")]);
    assert_padded_non_overlap(&layout, &container);
    assert!(verify_layout(&boxes, &container, &layout).is_ok());
}

#[test]
fn test_deterministic_and_order_independent() {
    let boxes = corpus(80, 42);
    let container = ContainerSpec::new(250.0, 250.0).with_padding(3.0);
    let options = PackingOptions::default().with_factor(PackingFactor::Best);

    let first = pack(&boxes, &container, &options).unwrap();
    let second = pack(&boxes, &container, &options).unwrap();
    assert_eq!(first, second);

    let mut reversed = boxes.clone();
    reversed.reverse();
    assert_eq!(first, pack(&reversed, &container, &options).unwrap());
}

#[test]
fn test_higher_presets_never_use_more_pages() {
    for seed in 1..=12 {
        let boxes = corpus(60, seed);
        let container = ContainerSpec::new(180.0, 240.0).with_padding(2.0);

        let pages: Vec<usize> = PackingFactor::ALL
            .iter()
            .map(|&factor| {
                let options = PackingOptions::default().with_factor(factor);
                pack(&boxes, &container, &options).unwrap().page_count()
            })
            .collect();

        assert!(
            pages.windows(2).all(|w| w[1] <= w[0]),
            "seed {seed}: pages per preset {pages:?}"
        );
    }
}

#[test]
fn test_zero_boxes_is_empty_layout() {
    let layout = pack(&[], &ContainerSpec::default(), &PackingOptions::default()).unwrap();
    assert_eq!(layout, PackedLayout::default());
}

#[test]
fn test_invalid_dimensions_rejected() {
    let container = ContainerSpec::new(100.0, 100.0);
    for (w, h) in [(0.0, 10.0), (10.0, -1.0), (f64::NAN, 10.0), (10.0, f64::INFINITY)] {
        let boxes = vec![PackBox::new("ok", 10.0, 10.0), PackBox::new("bad", w, h)];
        match pack(&boxes, &container, &draft()) {
            Err(PackError::InvalidInput(msg)) => assert!(msg.contains("bad")),
            other => panic!("Expected InvalidInput for {w}x{h}, got {other:?}"),
        }
    }
}

#[test]
fn test_duplicate_ids_rejected() {
    let boxes = vec![
        PackBox::new("twin", 10.0, 10.0),
        PackBox::new("other", 10.0, 10.0),
        PackBox::new("twin", 20.0, 20.0),
    ];
    let result = pack(&boxes, &ContainerSpec::new(100.0, 100.0), &draft());
    assert!(matches!(result, Err(PackError::InvalidInput(msg)) if msg.contains("twin")));
}

#[test]
fn test_invalid_container_rejected() {
    let boxes = vec![PackBox::new("a", 10.0, 10.0)];
    let bad = [
        ContainerSpec::new(0.0, 100.0),
        ContainerSpec::new(100.0, 100.0).with_padding(-1.0),
        ContainerSpec::new(100.0, 100.0).with_margin(Margin::uniform(-2.0)),
    ];
    for container in bad {
        let err = pack(&boxes, &container, &draft()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

#[test]
fn test_progress_is_monotonic_and_completes() {
    let boxes = corpus(500, 3);
    let container = ContainerSpec::new(300.0, 300.0);
    let mut fractions = Vec::new();
    let mut sink = |f: f64| fractions.push(f);

    pack_with_progress(
        &boxes,
        &container,
        &PackingOptions::default().with_factor(PackingFactor::Best),
        &mut sink,
        &CancelToken::new(),
    )
    .unwrap();

    assert!(fractions.len() > 2);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
    assert_eq!(fractions.last(), Some(&1.0));
}

#[test]
fn test_cancel_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let result = pack_with_progress(
        &corpus(10, 1),
        &ContainerSpec::new(200.0, 200.0),
        &draft(),
        &mut NoProgress,
        &token,
    );
    assert!(matches!(result, Err(PackError::Cancelled)));
}

#[test]
fn test_cancel_mid_run_discards_layout() {
    let token = CancelToken::new();
    let trigger = token.clone();
    let mut last = 0.0;
    let mut sink = |f: f64| {
        last = f;
        if f >= 0.3 {
            trigger.cancel();
        }
    };

    let result = pack_with_progress(
        &corpus(400, 9),
        &ContainerSpec::new(200.0, 200.0),
        &draft(),
        &mut sink,
        &token,
    );

    assert!(matches!(result, Err(PackError::Cancelled)));
    assert!(last < 1.0);
}

#[tokio::test]
async fn test_pack_async_matches_sync() {
    let boxes = corpus(40, 5);
    let container = ContainerSpec::new(150.0, 150.0).with_padding(1.5);
    let options = PackingOptions::default();

    let expected = pack(&boxes, &container, &options).unwrap();
    let layout = pack_async(&boxes, &container, &options).await.unwrap();
    assert_eq!(layout, expected);
}

#[test]
fn test_large_units_pack_cleanly() {
    for scale in [1.0e6, 3.3e6, 1.0e7, 4.7e8] {
        for seed in 1..=6 {
            let boxes: Vec<PackBox> = corpus(40, seed)
                .into_iter()
                .map(|b| {
                    PackBox::new(b.id, b.width * scale + 1.0 / 3.0, b.height * scale + 0.7)
                })
                .collect();
            let container = ContainerSpec::new(240.0 * scale + 0.25, 310.0 * scale + 0.5)
                .with_margin(Margin::uniform(12.345 * scale))
                .with_padding(3.7 * scale + 0.1);

            let layout = pack(&boxes, &container, &PackingOptions::default())
                .unwrap_or_else(|e| panic!("scale {scale}, seed {seed}: {e}"));

            assert!(layout.unplaceable.is_empty());
            assert_eq!(layout.placed_count(), boxes.len());
            assert!(verify_layout(&boxes, &container, &layout).is_ok());
        }
    }
}
