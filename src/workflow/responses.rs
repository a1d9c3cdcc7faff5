//! Fixed set of maker resubmission responses.
//!
//! When a rejected question goes back to Pending, the maker picks one
//! of these canned responses; free text is not accepted.

use phf::phf_set;

pub static MAKER_RESPONSES: phf::Set<&'static str> = phf_set! {
    "Corrections done",
    "Updated as suggested",
    "Changed the correct option",
    "Rewrote the explanation",
    "Replaced the image",
    "No changes required",
};

pub fn is_valid_response(response: &str) -> bool {
    MAKER_RESPONSES.contains(response)
}
