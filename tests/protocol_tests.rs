//! Protocol tests for QRForge
//!
//! Parser totality, exact wire strings, and codec symmetry, without
//! touching any sockets.

use bytes::Bytes;
use qrforge::protocol::{
    decode_response, encode_request, encode_response, handle_request, parse_request, Command,
    Response, DEFAULT_ZOOM, ERROR_PREFIX, IMAGE_PREFIX,
};
use qrforge::{ForgeError, Generator};

// =============================================================================
// Request Parsing Tests
// =============================================================================

#[test]
fn test_parse_text_request() {
    let command = parse_request(b"TEXT:hello").unwrap();
    assert_eq!(
        command,
        Command::Text {
            content: "hello".to_string()
        }
    );
}

#[test]
fn test_parse_text_empty_payload_is_accepted() {
    let command = parse_request(b"TEXT:").unwrap();
    assert_eq!(
        command,
        Command::Text {
            content: String::new()
        }
    );
}

#[test]
fn test_parse_text_keeps_payload_verbatim() {
    // No trimming, and the payload may itself contain delimiters
    let command = parse_request(b"TEXT: geo:1,2?z=3 ").unwrap();
    assert_eq!(
        command,
        Command::Text {
            content: " geo:1,2?z=3 ".to_string()
        }
    );
}

#[test]
fn test_parse_geo_request() {
    let command = parse_request(b"GEO:45.1234,-122.6762").unwrap();
    match command {
        Command::Geo {
            latitude,
            longitude,
            zoom,
        } => {
            assert_eq!(latitude, 45.1234);
            assert_eq!(longitude, -122.6762);
            assert_eq!(zoom, DEFAULT_ZOOM);
        }
        other => panic!("Expected GEO command, got {:?}", other),
    }
}

#[test]
fn test_parse_geo_integer_coordinates() {
    let command = parse_request(b"GEO:7,-3").unwrap();
    match command {
        Command::Geo {
            latitude,
            longitude,
            ..
        } => {
            assert_eq!(latitude, 7.0);
            assert_eq!(longitude, -3.0);
        }
        other => panic!("Expected GEO command, got {:?}", other),
    }
}

#[test]
fn test_parse_geo_missing_comma() {
    let err = parse_request(b"GEO:45.1234").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidGeo));
}

#[test]
fn test_parse_geo_malformed_latitude() {
    let err = parse_request(b"GEO:abc,50").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidGeo));
}

#[test]
fn test_parse_geo_trailing_junk_is_rejected() {
    // The whole token must parse, so a second comma poisons the longitude
    let err = parse_request(b"GEO:1,2,3").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidGeo));

    let err = parse_request(b"GEO:1,2x").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidGeo));
}

#[test]
fn test_parse_geo_empty_halves() {
    assert!(matches!(
        parse_request(b"GEO:,").unwrap_err(),
        ForgeError::InvalidGeo
    ));
    assert!(matches!(
        parse_request(b"GEO:45.0,").unwrap_err(),
        ForgeError::InvalidGeo
    ));
    assert!(matches!(
        parse_request(b"GEO:,45.0").unwrap_err(),
        ForgeError::InvalidGeo
    ));
}

#[test]
fn test_parse_unknown_prefix() {
    let err = parse_request(b"FOO:bar").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidRequest));
}

#[test]
fn test_parse_empty_input() {
    let err = parse_request(b"").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidRequest));
}

#[test]
fn test_parse_prefix_is_case_sensitive() {
    assert!(matches!(
        parse_request(b"text:hello").unwrap_err(),
        ForgeError::InvalidRequest
    ));
    assert!(matches!(
        parse_request(b"Geo:1,2").unwrap_err(),
        ForgeError::InvalidRequest
    ));
}

#[test]
fn test_parse_prefix_without_colon() {
    let err = parse_request(b"TEXT").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidRequest));
}

#[test]
fn test_parse_rejects_invalid_utf8() {
    let err = parse_request(b"TEXT:\xff\xfe").unwrap_err();
    assert!(matches!(err, ForgeError::InvalidRequest));
}

#[test]
fn test_parsing_is_total() {
    // Every byte sequence must yield Ok or Err, never a panic
    let inputs: [&[u8]; 10] = [
        b"",
        b"\x00\x01\x02\x03",
        b"TEXT",
        b"TEXT:\x00",
        b"GEO:",
        b"GEO:\xffnan,inf",
        b"QRCODE:already-a-response",
        b"ERROR:not-a-request",
        b"TEXT:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        b"GEO:1e309,-1e309",
    ];

    for input in inputs {
        let _ = parse_request(input);
    }
}

#[test]
fn test_parse_geo_accepts_infinite_literals() {
    // "inf" is a valid float literal; rejecting it is the validator's job
    let command = parse_request(b"GEO:inf,0").unwrap();
    match command {
        Command::Geo { latitude, .. } => assert!(latitude.is_infinite()),
        other => panic!("Expected GEO command, got {:?}", other),
    }
}

// =============================================================================
// Error Display Tests (these strings go on the wire)
// =============================================================================

#[test]
fn test_error_messages_are_exact() {
    assert_eq!(ForgeError::InvalidRequest.to_string(), "Invalid request format");
    assert_eq!(ForgeError::InvalidGeo.to_string(), "Invalid GEO format");
    assert_eq!(
        ForgeError::CoordinatesOutOfRange.to_string(),
        "Invalid coordinates (lat: -90..90, long: -180..180)"
    );
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_text_request() {
    let request = encode_request(&Command::Text {
        content: "hello".to_string(),
    });
    assert_eq!(request, b"TEXT:hello");
}

#[test]
fn test_encode_geo_request() {
    let request = encode_request(&Command::Geo {
        latitude: 45.5,
        longitude: -120.25,
        zoom: DEFAULT_ZOOM,
    });
    assert_eq!(request, b"GEO:45.5,-120.25");
}

#[test]
fn test_request_round_trip() {
    let original = Command::Geo {
        latitude: 45.1234,
        longitude: -122.6762,
        zoom: DEFAULT_ZOOM,
    };

    let parsed = parse_request(&encode_request(&original)).unwrap();
    assert_eq!(parsed, original);
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_image_response() {
    let response = Response::image(Bytes::from_static(&[1, 2, 3]));
    assert_eq!(&encode_response(&response)[..], b"QRCODE:\x01\x02\x03");
}

#[test]
fn test_encode_error_response() {
    let response = Response::error("boom");
    assert_eq!(&encode_response(&response)[..], b"ERROR:boom");
}

#[test]
fn test_decode_image_response() {
    let response = decode_response(b"QRCODE:abc").unwrap();
    assert_eq!(response, Response::Image(Bytes::from_static(b"abc")));
    assert!(!response.is_error());
}

#[test]
fn test_decode_error_response() {
    let response = decode_response(b"ERROR:nope").unwrap();
    assert_eq!(response, Response::Error("nope".to_string()));
    assert!(response.is_error());
}

#[test]
fn test_decode_unrecognized_response() {
    let err = decode_response(b"HELLO:world").unwrap_err();
    assert!(matches!(err, ForgeError::Protocol(_)));

    let err = decode_response(b"").unwrap_err();
    assert!(matches!(err, ForgeError::Protocol(_)));
}

#[test]
fn test_response_prefixes_are_exact() {
    assert_eq!(IMAGE_PREFIX, b"QRCODE:");
    assert_eq!(ERROR_PREFIX, b"ERROR:");
}

// =============================================================================
// Request Pipeline Tests
// =============================================================================

#[test]
fn test_handle_request_out_of_range_coordinates() {
    let generator = Generator::new();
    let response = handle_request(b"GEO:100,50", &generator);
    assert_eq!(
        &encode_response(&response)[..],
        b"ERROR:Invalid coordinates (lat: -90..90, long: -180..180)" as &[u8]
    );
}

#[test]
fn test_handle_request_malformed_geo() {
    let generator = Generator::new();
    let response = handle_request(b"GEO:abc,50", &generator);
    assert_eq!(&encode_response(&response)[..], b"ERROR:Invalid GEO format");
}

#[test]
fn test_handle_request_unknown_prefix() {
    let generator = Generator::new();
    let response = handle_request(b"FOO:bar", &generator);
    assert_eq!(
        &encode_response(&response)[..],
        b"ERROR:Invalid request format"
    );
}

#[test]
fn test_handle_request_text_produces_png() {
    let generator = Generator::new();
    let response = handle_request(b"TEXT:hello", &generator);

    let frame = encode_response(&response);
    assert!(frame.starts_with(IMAGE_PREFIX));
    // PNG signature right after the prefix
    assert_eq!(&frame[IMAGE_PREFIX.len()..IMAGE_PREFIX.len() + 8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_handle_request_never_panics_on_garbage() {
    let generator = Generator::new();

    let inputs: [&[u8]; 6] = [
        b"",
        b"\xff\xff\xff",
        b"GEO:nan,nan",
        b"GEO:1e309,0",
        b"TEXT:",
        b"PING",
    ];

    for input in inputs {
        let response = handle_request(input, &generator);
        let frame = encode_response(&response);
        assert!(frame.starts_with(IMAGE_PREFIX) || frame.starts_with(ERROR_PREFIX));
    }
}
