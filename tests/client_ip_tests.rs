use std::net::SocketAddr;

use actix_web::test::TestRequest;
use contact_gate::utils::get_client_ip::get_client_ip;

fn peer() -> SocketAddr {
    "192.0.2.10:54321".parse().unwrap()
}

#[test]
fn first_forwarded_for_entry_wins() {
    let req = TestRequest::default()
        .insert_header(("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"))
        .insert_header(("x-real-ip", "198.51.100.20"))
        .peer_addr(peer())
        .to_http_request();

    assert_eq!(get_client_ip(&req, true), "203.0.113.7");
}

#[test]
fn real_ip_is_used_without_forwarded_for() {
    let req = TestRequest::default()
        .insert_header(("x-real-ip", "198.51.100.20"))
        .peer_addr(peer())
        .to_http_request();

    assert_eq!(get_client_ip(&req, true), "198.51.100.20");
}

#[test]
fn blank_forwarded_for_falls_through_to_real_ip() {
    let req = TestRequest::default()
        .insert_header(("x-forwarded-for", " "))
        .insert_header(("x-real-ip", "198.51.100.20"))
        .to_http_request();

    assert_eq!(get_client_ip(&req, true), "198.51.100.20");
}

#[test]
fn peer_address_is_used_without_proxy_headers() {
    let req = TestRequest::default().peer_addr(peer()).to_http_request();

    assert_eq!(get_client_ip(&req, true), "192.0.2.10");
}

#[test]
fn proxy_headers_are_ignored_when_untrusted() {
    let req = TestRequest::default()
        .insert_header(("x-forwarded-for", "203.0.113.7"))
        .insert_header(("x-real-ip", "198.51.100.20"))
        .peer_addr(peer())
        .to_http_request();

    assert_eq!(get_client_ip(&req, false), "192.0.2.10");
}

#[test]
fn unknown_without_any_source() {
    let req = TestRequest::default().to_http_request();

    assert_eq!(get_client_ip(&req, true), "unknown");
    assert_eq!(get_client_ip(&req, false), "unknown");
}
