use packing::{Packed, PackedSize};

use crate::scsi::enums::SpcVersion;

// ASCII space is used to pad shorter string identifiers as per SPC
const ASCII_SPACE: u8 = 0x20;

/// Left-aligned ASCII field of `N` bytes, padded with spaces. Panics if `value` is longer.
pub const fn space_padded<const N: usize>(value: &str) -> [u8; N] {
    let bytes = value.as_bytes();
    assert!(bytes.len() <= N);
    let mut field = [ASCII_SPACE; N];
    let mut i = 0;
    while i < bytes.len() {
        field[i] = bytes[i];
        i += 1;
    }
    field
}

/// Standard INQUIRY data, the 36 byte mandatory portion
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
#[packed(big_endian, lsb0)]
pub struct InquiryResponse {
    /// Zero: a logical unit of the given type is connected
    #[pkd(7, 5, 0, 0)]
    pub peripheral_qualifier: u8,

    /// Zero: direct access block device
    #[pkd(4, 0, 0, 0)]
    pub peripheral_device_type: u8,

    ///A removable medium ( RMB ) bit set to one indicates that the medium is removable.
    #[pkd(7, 7, 1, 1)]
    pub removable_medium: bool,

    ///The VERSION field indicates the implemented version of the standard
    #[pkd(7, 0, 2, 2)]
    pub version: SpcVersion,

    ///Response data formats below 2h are obsolete
    #[pkd(3, 0, 3, 3)]
    pub response_data_format: u8,

    ///Set to total length in bytes minus 5
    #[pkd(7, 0, 4, 4)]
    pub additional_length: u8,

    ///Eight bytes of left-aligned ASCII data identifying the vendor of the logical unit
    #[pkd(7, 0, 8, 15)]
    pub vendor_identification: [u8; 8],

    ///Sixteen bytes of left-aligned ASCII data defined by the vendor
    #[pkd(7, 0, 16, 31)]
    pub product_identification: [u8; 16],

    ///Four bytes of left-aligned ASCII data defined by the vendor
    #[pkd(7, 0, 32, 35)]
    pub product_revision_level: [u8; 4],
}

impl InquiryResponse {
    /// `vendor` should come from [t10](https://www.t10.org/lists/2vid.htm); any semi-unique
    /// non-blank string works for local development. Panics if > 8 characters are supplied.
    ///
    /// `product` panics if > 16 characters are supplied, `revision` if > 4.
    pub const fn new(vendor: &str, product: &str, revision: &str) -> Self {
        InquiryResponse {
            peripheral_qualifier: 0,
            peripheral_device_type: 0,
            removable_medium: true,
            version: SpcVersion::Scsi2,
            response_data_format: 2,
            additional_length: (<Self as PackedSize>::BYTES - 5) as u8,
            vendor_identification: space_padded::<8>(vendor),
            product_identification: space_padded::<16>(product),
            product_revision_level: space_padded::<4>(revision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_identifiers_with_spaces() {
        let mut bytes = [0u8; 36];
        assert_eq!(InquiryResponse::BYTES, 36);
        InquiryResponse::new("Adafruit", "Feather52840", "1.0").pack(&mut bytes).unwrap();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 0x80);
        assert_eq!(bytes[2], 2);
        assert_eq!(bytes[3], 2);
        assert_eq!(bytes[4], 31);
        assert_eq!(&bytes[8..16], b"Adafruit");
        assert_eq!(&bytes[16..32], b"Feather52840    ");
        assert_eq!(&bytes[32..36], b"1.0 ");
    }

    #[test]
    fn short_values_are_padded() {
        assert_eq!(space_padded::<4>("ab"), *b"ab  ");
        assert_eq!(space_padded::<3>(""), *b"   ");
    }

    #[test]
    #[should_panic]
    fn rejects_long_vendor() { let _ = InquiryResponse::new("TooLongVendor", "p", "r"); }
}
