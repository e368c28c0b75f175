use axum::http::HeaderMap;
use std::net::IpAddr;

/// Derive the client address used as the rate-limit key.
///
/// Order: first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// transport address, then loopback. Header values are spoofable; behind
/// an edge proxy that is acceptable, this is not a security boundary by
/// itself.
pub fn client_addr(headers: &HeaderMap, transport: Option<IpAddr>) -> IpAddr {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            if let Ok(ip) = first.trim().parse::<IpAddr>() {
                return ip;
            }
        }
    }
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        if let Ok(ip) = real_ip.trim().parse::<IpAddr>() {
            return ip;
        }
    }
    transport.unwrap_or_else(|| IpAddr::from([127, 0, 0, 1]))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));
        let ip = client_addr(&headers, Some(IpAddr::from([9, 9, 9, 9])));
        assert_eq!(ip, IpAddr::from([1, 2, 3, 4]));
    }

    #[test]
    fn falls_back_through_real_ip_and_transport() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));
        assert_eq!(client_addr(&headers, None), IpAddr::from([5, 6, 7, 8]));

        let headers = HeaderMap::new();
        assert_eq!(client_addr(&headers, Some(IpAddr::from([9, 9, 9, 9]))), IpAddr::from([9, 9, 9, 9]));
        assert_eq!(client_addr(&headers, None), IpAddr::from([127, 0, 0, 1]));
    }

    #[test]
    fn garbage_forwarded_for_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_addr(&headers, None), IpAddr::from([127, 0, 0, 1]));
    }
}
