use proptest::prelude::*;
use render_spy::prelude::*;
use render_spy_test_utils::Fixtures;

/// `Level0 > Level1 > ... > Level{n-1}`, each wrapping the next in a `div`
fn chain(levels: usize) -> ComponentDef {
    let mut next: Option<ComponentDef> = None;
    for level in (0..levels).rev() {
        let inner = next.take();
        let name = format!("Level{level}");
        next = Some(ComponentDef::function(&name, move |_| {
            let child: Node = match &inner {
                Some(def) => VNode::component(def).into(),
                None => Node::text("leaf"),
            };
            h("div").child(child).into()
        }));
    }
    next.unwrap()
}

proptest! {
    #[test]
    fn prop_list_finds_every_item(values in prop::collection::btree_set(0i64..1000, 0..12)) {
        let values: Vec<i64> = values.into_iter().collect();
        let fx = Fixtures::new();
        let context = render(fx.list_of(&values)).unwrap();

        let items = context.find("Item").unwrap();
        prop_assert_eq!(items.len(), values.len());
        let expected: String = values.iter().map(ToString::to_string).collect();
        prop_assert_eq!(context.text().unwrap(), expected);
    }

    #[test]
    fn prop_depth_bounds_rendered_levels(levels in 1usize..6, depth in 1usize..8) {
        let root = chain(levels);
        let context = render_with(VNode::component(&root), RenderConfig::new().with_depth(depth)).unwrap();

        let rendered = context.find("div").unwrap().len();
        prop_assert_eq!(rendered, levels.min(depth));
        prop_assert_eq!(context.text().unwrap().is_empty(), depth < levels);
    }

    #[test]
    fn prop_clicks_accumulate(clicks in 0usize..8) {
        let fx = Fixtures::new();
        let context = render(VNode::component(&fx.counter)).unwrap();
        let mut last = context.revision();

        for _ in 0..clicks {
            context.find("button").unwrap().simulate("click", &[]).unwrap();
            prop_assert!(context.revision() > last);
            last = context.revision();
        }
        prop_assert_eq!(context.find("span").unwrap().text().unwrap(), clicks.to_string());
    }

    #[test]
    fn prop_queries_are_repeatable(values in prop::collection::btree_set(0i64..50, 1..6)) {
        let values: Vec<i64> = values.into_iter().collect();
        let fx = Fixtures::new();
        let context = render(fx.list_of(&values)).unwrap();

        prop_assert_eq!(context.text().unwrap(), context.text().unwrap());
        prop_assert_eq!(context.to_string(), context.to_string());
        let items = context.find("Item").unwrap();
        prop_assert_eq!(items.find("li").unwrap().len(), values.len());
    }
}

#[test]
fn test_unbounded_depth_renders_whole_chain() {
    let context = render_with(
        VNode::component(&chain(4)),
        RenderConfig::new().with_depth(0),
    )
    .unwrap();
    assert_eq!(context.find("div").unwrap().len(), 4);
    assert_eq!(context.text().unwrap(), "leaf");
}
