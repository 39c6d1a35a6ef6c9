//! Conversion scenarios over a stored graph

#[cfg(test)]
mod tests {
    use crate::{
        get_json_property, set_json_property, to_json, to_json_with, to_sorted_json_map, to_tree,
        ConvertConfig, ConvertError, JsonPath, JsonWriter, PathOptions,
    };
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::{json, Value as JsonValue};
    use trellis_domain::{
        Direction, Duration, ExpandSpec, GraphStore, Node, NodeId, Path, Point, Properties,
        Relationship, Value,
    };
    use trellis_store::SqliteGraph;

    fn props(entries: &[(&str, Value)]) -> Properties {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn node(store: &mut SqliteGraph, labels: &[&str], entries: &[(&str, Value)]) -> Node {
        store.create_node(labels, props(entries)).unwrap()
    }

    fn rel(store: &mut SqliteGraph, start: &Node, end: &Node, rel_type: &str, entries: &[(&str, Value)]) -> Relationship {
        store
            .create_relationship(start.id, end.id, rel_type, props(entries))
            .unwrap()
    }

    fn parse(text: &str) -> JsonValue {
        serde_json::from_str(text).unwrap()
    }

    fn assert_json_node(json: &JsonValue, id: &str, labels: Option<&[&str]>, properties: Option<JsonValue>) {
        assert_eq!(json["id"], id);
        assert_eq!(json["type"], "node");
        match labels {
            Some(labels) => assert_eq!(json["labels"], json!(labels)),
            None => assert!(json.get("labels").is_none()),
        }
        match properties {
            Some(properties) => assert_eq!(json["properties"], properties),
            None => assert!(json.get("properties").is_none()),
        }
    }

    #[test]
    fn test_to_json_plain_values() {
        assert_eq!(to_json(&Value::List(vec![Value::from(1), Value::from(2), Value::from(3)])), "[1,2,3]");
        let map = Value::map([
            ("a", Value::from(42)),
            ("b", Value::from("foo")),
            ("c", Value::List(vec![Value::from(1), Value::from(2), Value::from(3)])),
        ]);
        assert_eq!(to_json(&map), r#"{"a":42,"b":"foo","c":[1,2,3]}"#);
    }

    #[test]
    fn test_to_json_map_keys_sorted() {
        let map = Value::map([
            ("zeta", Value::from(1)),
            ("alpha", Value::from(2)),
            ("mid", Value::map([("y", Value::from(true)), ("x", Value::Null)])),
        ]);
        assert_eq!(to_json(&map), r#"{"alpha":2,"mid":{"x":null,"y":true},"zeta":1}"#);
    }

    #[test]
    fn test_to_json_collected_nodes() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let born = NaiveDate::from_ymd_opt(2015, 7, 4)
            .unwrap()
            .and_hms_opt(19, 32, 24)
            .unwrap();
        let nodes = vec![
            node(&mut store, &["User"], &[
                ("name", Value::from("Adam")),
                ("age", Value::from(42)),
                ("male", Value::from(true)),
                ("kids", Value::List(vec![Value::from("Sam"), Value::from("Anna"), Value::from("Grace")])),
                ("born", Value::from(born)),
                ("place", Value::from(Point::wgs84_3d(56.7, 12.78, 1.1))),
            ]),
            node(&mut store, &["User"], &[("name", Value::from("Jim")), ("age", Value::from(42))]),
            node(&mut store, &["User"], &[("age", Value::from(12))]),
            node(&mut store, &["User"], &[]),
            node(&mut store, &[], &[("pippo", Value::from("pluto"))]),
        ];
        let list = Value::List(nodes.into_iter().map(Value::from).collect());

        let json = parse(&to_json(&list));
        assert_eq!(json.as_array().unwrap().len(), 5);
        assert_json_node(
            &json[0],
            "0",
            Some(&["User"]),
            Some(json!({
                "name": "Adam", "age": 42, "male": true, "kids": ["Sam", "Anna", "Grace"],
                "born": "2015-07-04T19:32:24",
                "place": {"crs": "wgs-84-3d", "latitude": 12.78, "longitude": 56.7, "height": 1.1}
            })),
        );
        assert_json_node(&json[1], "1", Some(&["User"]), Some(json!({"name": "Jim", "age": 42})));
        assert_json_node(&json[2], "2", Some(&["User"]), Some(json!({"age": 12})));
        assert_json_node(&json[3], "3", Some(&["User"]), None);
        assert_json_node(&json[4], "4", None, Some(json!({"pippo": "pluto"})));
    }

    #[test]
    fn test_to_json_map_of_nodes() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let a = node(&mut store, &["Test"], &[("foo", Value::from(7))]);
        let b = node(&mut store, &["Test"], &[("bar", Value::from(9))]);

        let json = parse(&to_json(&Value::map([("one", Value::from(a)), ("two", Value::from(b))])));
        assert_json_node(&json["one"], "0", Some(&["Test"]), Some(json!({"foo": 7})));
        assert_json_node(&json["two"], "1", Some(&["Test"]), Some(json!({"bar": 9})));
    }

    #[test]
    fn test_to_json_relationship_resolves_endpoints() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let adam = node(&mut store, &["User"], &[("name", Value::from("Adam"))]);
        let jim = node(&mut store, &["User"], &[("name", Value::from("Jim")), ("age", Value::from(42))]);
        let knows = rel(&mut store, &adam, &jim, "KNOWS", &[
            ("since", Value::from(1993.1)),
            ("bffSince", Value::from(Duration::new(5, 1, 12 * 3600, 0))),
        ]);

        let json = parse(&to_json_with(&Value::from(knows), &store));
        assert_eq!(json["id"], "0");
        assert_eq!(json["type"], "relationship");
        assert_eq!(json["label"], "KNOWS");
        assert_eq!(json["properties"], json!({"since": 1993.1, "bffSince": "P5M1DT12H"}));
        assert_json_node(&json["start"], "0", Some(&["User"]), Some(json!({"name": "Adam"})));
        assert_json_node(&json["end"], "1", Some(&["User"]), Some(json!({"name": "Jim", "age": 42})));
    }

    #[test]
    fn test_to_json_path() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let three = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let a = node(&mut store, &["Test"], &[("foo", Value::from(7))]);
        let b = node(&mut store, &["Baz"], &[("a", Value::from("b"))]);
        let c = node(&mut store, &["Bar"], &[
            ("one", Value::from("www")),
            ("two", Value::from(2)),
            ("three", Value::from(three)),
        ]);
        let ab = rel(&mut store, &a, &b, "TEST", &[]);
        let cb = rel(&mut store, &c, &b, "TEST_2", &[("aa", Value::from("bb"))]);
        let path = Path::new(vec![a, b, c], vec![ab, cb]).unwrap();

        let json = parse(&to_json(&Value::from(path)));
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 5);

        let bar = json!({"one": "www", "two": 2, "three": "2020-01-01T00:00"});
        assert_json_node(&list[0], "0", Some(&["Test"]), Some(json!({"foo": 7})));
        assert_eq!(list[1]["id"], "0");
        assert_eq!(list[1]["label"], "TEST");
        assert!(list[1].get("properties").is_none());
        assert_json_node(&list[1]["start"], "0", Some(&["Test"]), Some(json!({"foo": 7})));
        assert_json_node(&list[1]["end"], "1", Some(&["Baz"]), Some(json!({"a": "b"})));
        assert_json_node(&list[2], "1", Some(&["Baz"]), Some(json!({"a": "b"})));
        assert_eq!(list[3]["id"], "1");
        assert_eq!(list[3]["properties"], json!({"aa": "bb"}));
        assert_json_node(&list[3]["start"], "2", Some(&["Bar"]), Some(bar.clone()));
        assert_json_node(&list[3]["end"], "1", Some(&["Baz"]), Some(json!({"a": "b"})));
        assert_json_node(&list[4], "2", Some(&["Bar"]), Some(bar));
    }

    #[test]
    fn test_to_json_list_of_paths_continues_ids() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let a = node(&mut store, &["Test"], &[("foo", Value::from(7))]);
        let b = node(&mut store, &["Baa", "Baz"], &[("a", Value::from("b"))]);
        let omega = node(&mut store, &["Omega"], &[("alpha", Value::from("beta"))]);
        let bar = node(&mut store, &["Bar"], &[("one", Value::from("www"))]);
        let ab = rel(&mut store, &a, &b, "TEST", &[]);
        let bar_omega = rel(&mut store, &bar, &omega, "TEST_2", &[("aa", Value::from("bb"))]);

        let p = Path::new(vec![a, b], vec![ab]).unwrap();
        let q = Path::new(vec![omega, bar], vec![bar_omega]).unwrap();
        let json = parse(&to_json(&Value::List(vec![p.into(), q.into()])));

        let first = json[0].as_array().unwrap();
        let second = json[1].as_array().unwrap();
        assert_json_node(&first[0], "0", Some(&["Test"]), Some(json!({"foo": 7})));
        assert_json_node(&first[2], "1", Some(&["Baa", "Baz"]), Some(json!({"a": "b"})));
        assert_json_node(&second[0], "2", Some(&["Omega"]), Some(json!({"alpha": "beta"})));
        assert_eq!(second[1]["id"], "1");
        assert_json_node(&second[1]["start"], "3", Some(&["Bar"]), Some(json!({"one": "www"})));
        assert_json_node(&second[1]["end"], "2", Some(&["Omega"]), Some(json!({"alpha": "beta"})));
        assert_json_node(&second[2], "3", Some(&["Bar"]), Some(json!({"one": "www"})));
    }

    #[test]
    fn test_set_and_get_json_property() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let n = node(&mut store, &[], &[]);
        let list = Value::List(vec![Value::from(1), Value::from(2), Value::from(3)]);

        let updated = set_json_property(&mut store, n.id, "json", &list).unwrap();
        assert_eq!(updated.property("json"), Some(&Value::from("[1,2,3]")));

        let stored = store.node(n.id).unwrap().unwrap();
        assert_eq!(get_json_property(&stored, "json", None, None::<&[&str]>).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_set_json_property_resolves_relationship_endpoints() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let a = node(&mut store, &["User"], &[("name", Value::from("Adam"))]);
        let b = node(&mut store, &["User"], &[("name", Value::from("Jim"))]);
        let knows = rel(&mut store, &a, &b, "KNOWS", &[]);
        let holder = node(&mut store, &["Holder"], &[]);

        set_json_property(&mut store, holder.id, "rel", &Value::from(knows)).unwrap();

        let stored = store.node(holder.id).unwrap().unwrap();
        let json = get_json_property(&stored, "rel", None, None::<&[&str]>).unwrap();
        assert_json_node(&json["start"], "0", Some(&["User"]), Some(json!({"name": "Adam"})));
        assert_json_node(&json["end"], "1", Some(&["User"]), Some(json!({"name": "Jim"})));
    }

    #[test]
    fn test_to_json_without_resolver_writes_bare_endpoints() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let a = node(&mut store, &["User"], &[]);
        let b = node(&mut store, &["User"], &[]);
        let knows = rel(&mut store, &a, &b, "KNOWS", &[]);

        let json = parse(&to_json(&Value::from(knows)));
        assert_eq!(json["start"], json!({"id": "0", "type": "node"}));
        assert_eq!(json["end"], json!({"id": "1", "type": "node"}));
    }

    #[test]
    fn test_set_json_property_on_missing_node() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let err = set_json_property(&mut store, NodeId::new(999), "json", &Value::Null).unwrap_err();
        assert!(matches!(err, ConvertError::Store(message) if message.contains("not found")));
    }

    #[test]
    fn test_sorted_map_of_stored_node() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let n = node(&mut store, &["Test"], &[("b", Value::from(1)), ("A", Value::from(2))]);
        assert_eq!(to_sorted_json_map(&Value::from(n), true).unwrap(), r#"{"A":2,"b":1}"#);
    }

    /// (m:Movie)<-[:ACTED_IN]-(:Actor) twice
    fn movie_paths(store: &mut SqliteGraph) -> Vec<Path> {
        let movie = node(store, &["Movie"], &[("title", Value::from("M"))]);
        (1..=2)
            .map(|i| {
                let actor = node(store, &["Actor"], &[("name", Value::from(format!("A{}", i)))]);
                let acted = rel(store, &actor, &movie, "ACTED_IN", &[("role", Value::from(format!("R{}", i)))]);
                Path::new(vec![movie.clone(), actor], vec![acted]).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_tree_movie_actors() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = movie_paths(&mut store);

        let trees = to_tree(&paths, true, &ConvertConfig::default()).unwrap();
        assert_eq!(trees.len(), 1);
        let root = &trees[0];
        assert_eq!(root["_type"], "Movie");
        assert_eq!(root["title"], "M");
        let actors = root["acted_in"].as_array().unwrap();
        assert_eq!(actors.len(), 2);
        assert_eq!(actors[0]["_type"], "Actor");
        assert_eq!(actors[0]["name"], "A1");
        assert_eq!(actors[0]["acted_in.role"], "R1");
        assert_eq!(actors[1]["acted_in.role"], "R2");
    }

    #[test]
    fn test_tree_upper_case_rels() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = movie_paths(&mut store);

        let trees = to_tree(&paths, false, &ConvertConfig::default()).unwrap();
        let actors = trees[0]["ACTED_IN"].as_array().unwrap();
        assert_eq!(actors[0]["_type"], "Actor");
        assert_eq!(actors[0]["ACTED_IN.role"], "R1");
        assert!(trees[0].get("acted_in").is_none());
    }

    /// (PC)-[:subcategory]->(Parts)-[:subcategory]->(CPU), root-to-leaf path only
    fn category_paths(store: &mut SqliteGraph) -> Vec<Path> {
        let pc = node(store, &["Category"], &[("name", Value::from("PC")), ("surname", Value::from("computer"))]);
        let parts = node(store, &["Category"], &[("name", Value::from("Parts"))]);
        let cpu = node(store, &["Category"], &[("name", Value::from("CPU"))]);
        rel(store, &pc, &parts, "subcategory", &[("id", Value::from(1)), ("subCat", Value::from("gen"))]);
        rel(store, &parts, &cpu, "subcategory", &[("id", Value::from(2)), ("subCat", Value::from("ex"))]);

        let spec = ExpandSpec::outgoing().with_type("subcategory");
        store
            .expand(pc.id, &spec)
            .unwrap()
            .into_iter()
            .filter(|path| path.end_node().id == cpu.id)
            .collect()
    }

    #[test]
    fn test_tree_leaf_nodes() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = category_paths(&mut store);
        assert_eq!(paths.len(), 1);

        let trees = to_tree(&paths, true, &ConvertConfig::default()).unwrap();
        let root = &trees[0];
        assert_eq!(root["_type"], "Category");
        assert_eq!(root["name"], "PC");
        let parts = root["subcategory"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["name"], "Parts");
        let sub_parts = parts[0]["subcategory"].as_array().unwrap();
        assert_eq!(sub_parts.len(), 1);
        assert_eq!(sub_parts[0]["_type"], "Category");
        assert_eq!(sub_parts[0]["name"], "CPU");
    }

    #[test]
    fn test_tree_include_filters() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = category_paths(&mut store);
        let config = ConvertConfig::from_json(&json!({
            "nodes": {"Category": ["name"]},
            "rels": {"subcategory": ["id"]}
        }))
        .unwrap();

        let trees = to_tree(&paths, true, &config).unwrap();
        let root = &trees[0];
        assert_eq!(root["name"], "PC");
        assert!(root.get("surname").is_none());
        let parts = &root["subcategory"][0];
        assert_eq!(parts["name"], "Parts");
        assert_eq!(parts["subcategory.id"], 1);
        assert!(parts.get("subcategory.subCat").is_none());
        assert!(parts.get("subcategory._id").is_some());
        let cpu = &parts["subcategory"][0];
        assert_eq!(cpu["name"], "CPU");
        assert_eq!(cpu["subcategory.id"], 2);
    }

    #[test]
    fn test_tree_exclude_filters() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = category_paths(&mut store);
        let config = ConvertConfig::from_json(&json!({
            "nodes": {"Category": ["-name"]},
            "rels": {"subcategory": ["-id"]}
        }))
        .unwrap();

        let trees = to_tree(&paths, true, &config).unwrap();
        let root = &trees[0];
        assert!(root.get("name").is_none());
        assert_eq!(root["surname"], "computer");
        let parts = &root["subcategory"][0];
        assert_eq!(parts["_type"], "Category");
        assert!(parts.get("name").is_none());
        assert!(parts.get("subcategory.id").is_none());
        assert_eq!(parts["subcategory.subCat"], "gen");
        assert_eq!(parts["subcategory"][0]["subcategory.subCat"], "ex");
    }

    #[test]
    fn test_tree_only_node_include() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = category_paths(&mut store);
        let config = ConvertConfig::from_json(&json!({"nodes": {"Category": ["name", "surname"]}})).unwrap();

        let trees = to_tree(&paths, true, &config).unwrap();
        let root = &trees[0];
        assert_eq!(root["name"], "PC");
        assert_eq!(root["surname"], "computer");
        let parts = &root["subcategory"][0];
        assert_eq!(parts["subcategory.id"], 1);
        assert_eq!(parts["subcategory.subCat"], "gen");
    }

    #[test]
    fn test_tree_mixed_filters_rejected() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = category_paths(&mut store);

        for config in [
            json!({"nodes": {"Category": ["-name", "name"]}, "rels": {"subcategory": ["-id"]}}),
            json!({"nodes": {"Category": ["-name"]}, "rels": {"subcategory": ["-id", "name"]}}),
        ] {
            let err = ConvertConfig::from_json(&config).unwrap_err();
            assert_eq!(err.to_string(), "Only include or exclude attribute are possible!");
        }

        let mut config = ConvertConfig::default();
        config.rels.insert("subcategory".to_string(), vec!["id".to_string(), "-subCat".to_string()]);
        assert_eq!(to_tree(&paths, true, &config).unwrap_err(), ConvertError::MixedPropertyFilter);
    }

    #[test]
    fn test_tree_child_order_without_sorting() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let names = ["root", "c0", "c1", "c2", "c00", "c01", "c10", "c100"];
        let nodes: Vec<Node> = names
            .iter()
            .map(|name| node(&mut store, &["TreeNode"], &[("name", Value::from(*name))]))
            .collect();
        for (parent, child, order) in [(0, 1, 0), (0, 2, 1), (0, 3, 2), (1, 4, 0), (1, 5, 1), (2, 6, 0), (6, 7, 0)] {
            rel(&mut store, &nodes[parent], &nodes[child], "CHILD", &[("order", Value::from(order))]);
        }

        let mut paths = store
            .expand(nodes[0].id, &ExpandSpec::default().with_direction(Direction::Outgoing).with_type("CHILD"))
            .unwrap();
        assert_eq!(paths.len(), 7);
        paths.sort_by_key(|path| {
            path.relationships()
                .iter()
                .map(|r| r.property("order").and_then(Value::as_i64).unwrap_or_default())
                .collect::<Vec<_>>()
        });

        let unsorted = ConvertConfig::from_json(&json!({"sortPaths": false})).unwrap();
        let trees = to_tree(&paths, true, &unsorted).unwrap();
        let children = trees[0]["child"].as_array().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0]["name"], "c0");
        assert_eq!(children[0]["child"].as_array().unwrap().len(), 2);

        // longest path first moves c1 ahead
        let trees = to_tree(&paths, true, &ConvertConfig::default()).unwrap();
        assert_eq!(trees[0]["child"][0]["name"], "c1");
    }

    #[test]
    fn test_tree_parent_node_ids() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let bib = node(&mut store, &["Bib"], &[("id", Value::from("bib")), ("langId", Value::from(2))]);
        let c = node(&mut store, &["Comm"], &[("id", Value::from("c")), ("langId", Value::from(2))]);
        let c1 = node(&mut store, &["Comm"], &[("id", Value::from("c1")), ("langId", Value::from(2))]);
        let u = node(&mut store, &["User"], &[("id", Value::from("u"))]);
        let u1 = node(&mut store, &["User"], &[("id", Value::from("u1"))]);
        let rel1 = rel(&mut store, &bib, &c, "HAS", &[("id", Value::from("rel1"))]);
        let rel2 = rel(&mut store, &bib, &c1, "HAS", &[("id", Value::from("rel2"))]);
        let rel3 = rel(&mut store, &u, &c1, "Flag", &[("id", Value::from("rel3")), ("FlagType", Value::from(4))]);
        let rel4 = rel(&mut store, &u, &c, "Flag", &[("id", Value::from("rel4")), ("FlagType", Value::from(5))]);
        let rel5 = rel(&mut store, &u1, &c, "Flag", &[("id", Value::from("rel5")), ("FlagType", Value::from(2))]);
        let rel6 = rel(&mut store, &u1, &c1, "Flag", &[("id", Value::from("rel6")), ("FlagType", Value::from(1))]);

        let path = |has: &Relationship, comm: &Node, flag: &Relationship, user: &Node| {
            Path::new(vec![bib.clone(), comm.clone(), user.clone()], vec![has.clone(), flag.clone()]).unwrap()
        };
        let paths = vec![
            path(&rel2, &c1, &rel3, &u),
            path(&rel2, &c1, &rel6, &u1),
            path(&rel1, &c, &rel4, &u),
            path(&rel1, &c, &rel5, &u1),
        ];

        let trees = to_tree(&paths, true, &ConvertConfig::default()).unwrap();
        assert_eq!(trees.len(), 1);
        let root = &trees[0];
        assert_eq!(root["_type"], "Bib");
        assert_eq!(root["_id"], bib.id.value());
        assert_eq!(root["_elementId"], bib.element_id.as_str());
        assert_eq!(root["langId"], 2);

        let has = root["has"].as_array().unwrap();
        assert_eq!(has.len(), 2);
        assert_eq!(has[0]["id"], "c1");
        assert_eq!(has[0]["_elementId"], c1.element_id.as_str());

        let flags = has[0]["flag"].as_array().unwrap();
        assert_eq!(flags.len(), 2);
        assert_eq!(
            flags[0],
            json!({
                "_id": u.id.value(),
                "_elementId": u.element_id,
                "_type": "User",
                "id": "u",
                "flag._id": rel3.id.value(),
                "flag._elementId": rel3.element_id,
                "flag.FlagType": 4,
                "flag.id": "rel3"
            })
        );
        assert_eq!(has[1]["id"], "c");
        assert_eq!(has[1]["flag"][1]["flag.id"], "rel5");
    }

    #[test]
    fn test_tree_keeps_parallel_relationships() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let v1 = node(&mut store, &["N"], &[("id", Value::from("n21")), ("name", Value::from("Node 21"))]);
        let v2 = node(&mut store, &["N"], &[("id", Value::from("n22")), ("name", Value::from("Node 22"))]);
        rel(&mut store, &v1, &v2, "R", &[("prop1", Value::from("n21->n22 [1]"))]);
        rel(&mut store, &v1, &v2, "R", &[("prop1", Value::from("n21->n22 [2]"))]);

        let paths = store
            .expand(v1.id, &ExpandSpec::outgoing().with_depth(1, Some(1)))
            .unwrap();
        let trees = to_tree(&paths, false, &ConvertConfig::default()).unwrap();

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0]["id"], "n21");
        let branches = trees[0]["R"].as_array().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0]["R.prop1"], "n21->n22 [1]");
        assert_eq!(branches[1]["R.prop1"], "n21->n22 [2]");
        assert_eq!(branches[1]["id"], "n22");
    }

    #[test]
    fn test_tree_repeated_paths_deduplicate() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let paths = movie_paths(&mut store);
        let doubled: Vec<Path> = paths.iter().chain(paths.iter()).cloned().collect();

        let trees = to_tree(&doubled, true, &ConvertConfig::default()).unwrap();
        assert_eq!(trees[0]["acted_in"].as_array().unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_sorted_map_keys_are_ordered(entries in prop::collection::btree_map("[a-zA-Z]{1,6}", any::<i64>(), 0..12)) {
            let map = Value::Map(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
            let text = to_sorted_json_map(&map, true).unwrap();
            let parsed: serde_json::Map<String, JsonValue> = serde_json::from_str(&text).unwrap();
            let keys: Vec<&String> = parsed.keys().collect();
            for pair in keys.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!((a.to_lowercase(), a.as_str()) < (b.to_lowercase(), b.as_str()));
            }
        }

        #[test]
        fn prop_negative_index_counts_from_end(items in prop::collection::vec(any::<i64>(), 1..20), offset in 0usize..20) {
            let position = offset % items.len();
            let document = json!(items);
            let from_end = -((items.len() - position) as i64);
            let path = JsonPath::compile(&format!("$[{}]", from_end)).unwrap();
            prop_assert_eq!(path.read(&document, &PathOptions::none()).unwrap(), json!(items[position]));
        }

        #[test]
        fn prop_distinct_nodes_numbered_in_order(count in 0usize..16) {
            let nodes: Vec<Value> = (0..count)
                .map(|i| Node::new(NodeId::new(1000 - i as i64), format!("n{}", i)).into())
                .collect();
            let json = JsonWriter::new().write(&Value::List(nodes));
            for (i, item) in json.as_array().unwrap().iter().enumerate() {
                prop_assert_eq!(&item["id"], &json!(i.to_string()));
            }
        }
    }
}
