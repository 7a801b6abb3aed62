use tsuji::{Error, MatchResult, Method, MethodFilter, Params, Router, TemplateError};

fn params(pairs: &[(&'static str, &'static str)]) -> Params {
    pairs.iter().copied().collect()
}

#[test]
fn literal_templates_match_exactly_with_no_params() {
    let router = Router::new()
        .on(Method::Get, "/", 0)
        .on(Method::Get, "/health", 1)
        .on(Method::Post, "/api/v1/orders", 2);

    assert_eq!(
        router.resolve("GET", "/health"),
        MatchResult::Matched { handler: &1, params: Params::default() }
    );
    assert_eq!(
        router.resolve("POST", "/api/v1/orders"),
        MatchResult::Matched { handler: &2, params: Params::default() }
    );
    assert_eq!(router.resolve("GET", "").handler(), Some(&0));
    assert_eq!(router.resolve("GET", "/").handler(), Some(&0));
}

#[test]
fn literals_ignore_case_and_trailing_slash() {
    let router = Router::new().on(Method::Get, "/Api/Users", ());
    assert!(router.resolve("GET", "/api/users/").is_match());
    assert!(router.resolve("GET", "/API/USERS").is_match());
}

#[test]
fn catchall_not_last_is_rejected() {
    for pattern in ["/{*rest}/x", "/a/{*rest}/{id}", "/{**rest}/x"] {
        let mut router = Router::new();
        let err = router.register(Method::Get, pattern, ()).unwrap_err();
        assert!(
            matches!(
                err,
                Error::InvalidTemplate { reason: TemplateError::CatchallNotLast(ref n), .. } if n == "rest"
            ),
            "{pattern}: {err}"
        );
    }
}

#[test]
fn invalid_templates_are_rejected_at_registration() {
    let cases = [
        ("/{id:slug}", TemplateError::UnknownConstraint("slug".into())),
        ("/{id}/{ID}", TemplateError::DuplicateParameter("ID".into())),
        ("/{n:length(abc)}", TemplateError::MalformedConstraint("length(abc)".into())),
        ("/{id?}/more", TemplateError::OptionalNotLast("id".into())),
    ];
    for (pattern, expected) in cases {
        let mut router = Router::new();
        match router.register(Method::Get, pattern, ()) {
            Err(Error::InvalidTemplate { reason, .. }) => assert_eq!(reason, expected, "{pattern}"),
            other => panic!("{pattern}: unexpected {other:?}"),
        }
    }
}

#[test]
fn admin_literal_wins_in_either_order() {
    let orders = [["/users/{id}", "/users/admin"], ["/users/admin", "/users/{id}"]];
    for patterns in orders {
        let mut router = Router::new();
        for p in patterns {
            router.register(Method::Get, p, p).unwrap();
        }
        assert_eq!(router.resolve("GET", "/users/admin").handler(), Some(&"/users/admin"));
    }
}

#[test]
fn constrained_then_unconstrained() {
    let router = Router::new()
        .on(Method::Get, "/users/{id:int}", "int")
        .on(Method::Get, "/users/{id}", "any");
    assert_eq!(router.resolve("GET", "/users/42").handler(), Some(&"int"));
    assert_eq!(router.resolve("GET", "/users/abc").handler(), Some(&"any"));
}

#[test]
fn unknown_method_or_shape_is_no_match() {
    let router = Router::new()
        .on(Method::Get, "/a/{b}", ())
        .on(Method::Post, "/a", ());

    assert_eq!(router.resolve("PUT", "/a/1"), MatchResult::NoMatch);
    assert_eq!(router.resolve("TRACE", "/a/1"), MatchResult::NoMatch);
    assert_eq!(router.resolve("GET", "/a/1/2"), MatchResult::NoMatch);
    assert_eq!(router.resolve("GET", "/a"), MatchResult::NoMatch);
    assert_eq!(Router::<()>::new().resolve("GET", "/"), MatchResult::NoMatch);
}

#[test]
fn any_filter_accepts_every_method() {
    let router = Router::new().on(MethodFilter::Any, "/ping", ());
    for method in ["GET", "DELETE", "TRACE", "BREW"] {
        assert!(router.resolve(method, "/ping").is_match(), "{method}");
    }
}

#[test]
fn resolve_is_idempotent() {
    let router = Router::new()
        .on(Method::Get, "/api/{version:regex(^v\\d+$)}/items/{id:guid}", 1)
        .on(Method::Get, "/api/{*rest}", 2);

    let path = "/api/v2/items/67e55044-10b1-426f-9247-bb680e5fe0c8";
    let first = router.resolve("GET", path);
    for _ in 0..10 {
        assert_eq!(router.resolve("GET", path), first);
    }
    assert_eq!(first.handler(), Some(&1));
}

#[test]
fn api_users_scenario() {
    let router = Router::new()
        .on(Method::Get, "/api/users/{id:int}", "handler1")
        .on(Method::Get, "/api/users/{id}", "handler2");

    assert_eq!(
        router.resolve("GET", "/api/users/123"),
        MatchResult::Matched { handler: &"handler1", params: params(&[("id", "123")]) }
    );
    assert_eq!(
        router.resolve("GET", "/api/users/abc"),
        MatchResult::Matched { handler: &"handler2", params: params(&[("id", "abc")]) }
    );
    assert_eq!(router.resolve("POST", "/api/users/123"), MatchResult::NoMatch);
}

#[test]
fn files_catchall_scenario() {
    let router = Router::new().on(Method::Get, "/files/{*path}", "files");
    assert_eq!(
        router.resolve("GET", "/files/a/b/c.txt"),
        MatchResult::Matched { handler: &"files", params: params(&[("path", "a/b/c.txt")]) }
    );
}

#[test]
fn catchall_matches_zero_segments_with_empty_string() {
    let router = Router::new().on(Method::Get, "/files/{*path}", ());
    assert_eq!(router.resolve("GET", "/files").params(), Some(&params(&[("path", "")])));
    assert_eq!(router.resolve("GET", "/files/").params(), Some(&params(&[("path", "")])));
}

#[test]
fn absent_optional_parameter_is_omitted() {
    let router = Router::new().on(Method::Get, "/posts/{page:int?}", ());

    let absent = router.resolve("GET", "/posts");
    assert_eq!(absent.params(), Some(&Params::default()));
    assert_eq!(absent.params().and_then(|p| p.get("page")), None);

    assert_eq!(router.resolve("GET", "/posts/3").params(), Some(&params(&[("page", "3")])));
    assert_eq!(router.resolve("GET", "/posts/three"), MatchResult::NoMatch);
    assert_eq!(router.resolve("GET", "/posts/3/4"), MatchResult::NoMatch);
}

#[test]
fn defaults_bind_when_segments_are_absent() {
    let router = Router::new().on(Method::Get, "/{controller=home}/{action=index}/{id?}", ());

    assert_eq!(
        router.resolve("GET", "/").params(),
        Some(&params(&[("controller", "home"), ("action", "index")]))
    );
    assert_eq!(
        router.resolve("GET", "/products/list/7").params(),
        Some(&params(&[("controller", "products"), ("action", "list"), ("id", "7")]))
    );
}

#[test]
fn chained_constraints_all_apply() {
    let router = Router::new().on(Method::Get, "/age/{n:int:range(18,120)}", ());
    assert!(router.resolve("GET", "/age/30").is_match());
    assert!(!router.resolve("GET", "/age/12").is_match());
    assert!(!router.resolve("GET", "/age/old").is_match());
}

#[test]
fn parameter_values_pass_through_verbatim() {
    let router = Router::new().on(Method::Get, "/tags/{tag}", ());
    assert_eq!(router.resolve("GET", "/TAGS/RuSt%20Lang").params(), Some(&params(&[("tag", "RuSt%20Lang")])));
}

#[test]
fn concurrent_resolution_is_consistent() {
    let router = Router::new()
        .on(Method::Get, "/users/{id:int}", 1)
        .on(Method::Get, "/users/{id}", 2)
        .on(Method::Get, "/users/admin", 3);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for i in 0..500 {
                    assert_eq!(router.resolve("GET", &format!("/users/{i}")).handler(), Some(&1));
                    assert_eq!(router.resolve("GET", "/users/bob").handler(), Some(&2));
                    assert_eq!(router.resolve("GET", "/users/admin").handler(), Some(&3));
                }
            });
        }
    });
}

#[test]
fn first_constrained_position_decides_in_either_order() {
    let orders = [["/{a:int}/{b}", "/{a}/{b:int}"], ["/{a}/{b:int}", "/{a:int}/{b}"]];
    for patterns in orders {
        let mut router = Router::new();
        for p in patterns {
            router.register(Method::Get, p, p).unwrap();
        }
        assert_eq!(router.resolve("GET", "/1/2").handler(), Some(&"/{a:int}/{b}"), "{patterns:?}");
        assert_eq!(router.resolve("GET", "/x/2").handler(), Some(&"/{a}/{b:int}"), "{patterns:?}");
        assert_eq!(router.resolve("GET", "/1/y").handler(), Some(&"/{a:int}/{b}"), "{patterns:?}");
    }
}

#[test]
fn more_literal_segments_win_regardless_of_position() {
    let router = Router::new()
        .on(Method::Get, "/x/{b}/{c}", "one_literal")
        .on(Method::Get, "/{a}/b/c", "two_literals");
    assert_eq!(router.resolve("GET", "/x/b/c").handler(), Some(&"two_literals"));
}

#[test]
fn remaining_ties_go_to_registration_order() {
    let router = Router::new()
        .on(Method::Get, "/files/{*path}", "catchall_first")
        .on(Method::Get, "/files/{name}", "param_second")
        .on(Method::Get, "/a/{rest?}", "optional_first")
        .on(Method::Get, "/a", "exact_second");
    assert_eq!(router.resolve("GET", "/files/a.txt").handler(), Some(&"catchall_first"));
    assert_eq!(router.resolve("GET", "/a").handler(), Some(&"optional_first"));
}

#[test]
fn default_must_satisfy_its_constraints() {
    let mut router = Router::new();
    match router.register(Method::Get, "/p/{id:int=abc}", ()) {
        Err(Error::InvalidTemplate { reason: TemplateError::InvalidDefault { name, default }, .. }) => {
            assert_eq!((name.as_str(), default.as_str()), ("id", "abc"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(router.is_empty());
}
