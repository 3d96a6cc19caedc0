#![feature(test)]

extern crate test;

use http::{Method, Uri};
use restmock::request_matchers::{method, request_to};
use restmock::response::with_success;
use restmock::{ClientRequest, ExpectationManager, ExpectationOrder, ExpectedCount};
use test::Bencher;

fn declared(order: ExpectationOrder, paths: &[&'static str]) -> ExpectationManager {
    let manager = ExpectationManager::new(order);
    for path in paths {
        manager
            .expect_request(ExpectedCount::many_times(), request_to(*path))
            .and_expect(method(Method::GET))
            .and_respond(with_success().body("hello"));
    }
    manager
}

fn get(uri: &'static str) -> ClientRequest {
    ClientRequest::new(Method::GET, Uri::from_static(uri))
}

#[bench]
fn bench_declare_expectations(b: &mut Bencher) {
    b.iter(|| declared(ExpectationOrder::Ordered, &["/a", "/b", "/c", "/d"]))
}

#[bench]
fn bench_validate_ordered(b: &mut Bencher) {
    let manager = declared(ExpectationOrder::Ordered, &["/a", "/b", "/c", "/d"]);
    for path in ["/a", "/b", "/c", "/d"] {
        manager.validate_request(&get(path)).unwrap();
    }

    let request = get("/d");
    b.iter(|| manager.validate_request(&request).unwrap())
}

#[bench]
fn bench_validate_strict_ordered(b: &mut Bencher) {
    let manager = declared(ExpectationOrder::StrictOrdered, &["/a", "/b", "/c", "/d"]);
    for path in ["/a", "/b", "/c", "/d"] {
        manager.validate_request(&get(path)).unwrap();
    }

    let request = get("/d");
    b.iter(|| manager.validate_request(&request).unwrap())
}

#[bench]
fn bench_validate_unordered(b: &mut Bencher) {
    let manager = declared(ExpectationOrder::Unordered, &["/a", "/b", "/c", "/d"]);

    let request = get("/d");
    b.iter(|| manager.validate_request(&request).unwrap())
}

#[bench]
fn bench_verify(b: &mut Bencher) {
    let manager = declared(ExpectationOrder::Unordered, &["/a", "/b"]);
    manager.validate_request(&get("/a")).unwrap();

    b.iter(|| manager.verify().unwrap_err())
}
