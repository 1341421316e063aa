//! Built-in snippet tables.
//!
//! Keys may list aliases separated by `|`; each alias maps to the same
//! expansion. Markup snippets are abbreviations themselves; stylesheet
//! snippets are `property:value|value` definitions or raw text.

use std::collections::HashMap;

use crate::config::SyntaxType;

/// Built-in snippets for a syntax, aliases expanded.
pub fn builtin(kind: SyntaxType, syntax: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    match kind {
        SyntaxType::Markup => {
            extend(&mut result, HTML);
            if syntax == "xsl" {
                extend(&mut result, XSL);
            }
        }
        SyntaxType::Stylesheet => extend(&mut result, CSS),
    }
    result
}

fn extend(target: &mut HashMap<String, String>, table: &[(&str, &str)]) {
    for (keys, value) in table {
        for key in keys.split('|') {
            target.insert(key.trim().to_string(), value.to_string());
        }
    }
}

pub const HTML: &[(&str, &str)] = &[
    ("a", "a[href]"),
    ("a:blank", "a[href='http://${0}' target='_blank' rel='noopener noreferrer']"),
    ("a:link", "a[href='http://${0}']"),
    ("a:mail", "a[href='mailto:${0}']"),
    ("a:tel", "a[href='tel:+${0}']"),
    ("abbr", "abbr[title]"),
    ("acr|acronym", "acronym[title]"),
    ("base", "base[href]/"),
    ("basefont", "basefont/"),
    ("br", "br/"),
    ("frame", "frame/"),
    ("hr", "hr/"),
    ("bdo", "bdo[dir]"),
    ("bdo:r", "bdo[dir=rtl]"),
    ("bdo:l", "bdo[dir=ltr]"),
    ("col", "col/"),
    ("link", "link[rel=stylesheet href]/"),
    ("link:css", "link[href='${1:style}.css']"),
    ("link:print", "link[href='${1:print}.css' media=print]"),
    ("link:favicon", "link[rel='shortcut icon' type=image/x-icon href='${1:favicon.ico}']"),
    ("link:mf|link:manifest", "link[rel='manifest' href='${1:manifest.json}']"),
    ("link:touch", "link[rel=apple-touch-icon href='${1:favicon.png}']"),
    ("link:rss", "link[rel=alternate type=application/rss+xml title=RSS href='${1:rss.xml}']"),
    ("link:atom", "link[rel=alternate type=application/atom+xml title=Atom href='${1:atom.xml}']"),
    ("link:im|link:import", "link[rel=import href='${1:component}.html']"),
    ("meta", "meta/"),
    ("meta:utf", "meta[http-equiv=Content-Type content='text/html;charset=UTF-8']"),
    ("meta:vp", "meta[name=viewport content='width=${1:device-width}, initial-scale=${2:1.0}']"),
    ("meta:compat", "meta[http-equiv=X-UA-Compatible content='${1:IE=7}']"),
    ("meta:edge", "meta:compat[content='${1:ie=edge}']"),
    ("meta:redirect", "meta[http-equiv=refresh content='0; url=${1:http://example.com}']"),
    ("meta:refresh", "meta[http-equiv=refresh content='${1:5}']"),
    ("meta:kw", "meta[name=keywords content]"),
    ("meta:desc", "meta[name=description content]"),
    ("style", "style"),
    ("script", "script"),
    ("script:src", "script[src]"),
    ("script:module", "script[type=module src]"),
    ("img", "img[src alt]/"),
    ("img:s|img:srcset", "img[srcset src alt]"),
    ("img:z|img:sizes", "img[sizes srcset src alt]"),
    ("picture", "picture"),
    ("src|source", "source/"),
    ("src:sc|source:src", "source[src type]"),
    ("src:s|source:srcset", "source[srcset]"),
    ("src:t|source:type", "source[srcset type='${1:image/}']"),
    ("src:z|source:sizes", "source[sizes srcset]"),
    ("src:m|source:media", "source[media='(${1:min-width: })' srcset]"),
    ("iframe", "iframe[src frameborder=0]"),
    ("embed", "embed[src type]/"),
    ("object", "object[data type]"),
    ("param", "param[name value]/"),
    ("map", "map[name]"),
    ("area", "area[shape coords href alt]/"),
    ("area:d", "area[shape=default]"),
    ("area:c", "area[shape=circle]"),
    ("area:r", "area[shape=rect]"),
    ("area:p", "area[shape=poly]"),
    ("form", "form[action]"),
    ("form:get", "form[method=get]"),
    ("form:post", "form[method=post]"),
    ("label", "label[for]"),
    ("input", "input[type=${1:text}]/"),
    ("inp", "input[name=${1} id=${1}]"),
    ("input:h|input:hidden", "input[type=hidden name]"),
    ("input:t|input:text", "inp[type=text]"),
    ("input:search", "inp[type=search]"),
    ("input:email", "inp[type=email]"),
    ("input:url", "inp[type=url]"),
    ("input:p|input:password", "inp[type=password]"),
    ("input:datetime", "inp[type=datetime]"),
    ("input:date", "inp[type=date]"),
    ("input:datetime-local", "inp[type=datetime-local]"),
    ("input:month", "inp[type=month]"),
    ("input:week", "inp[type=week]"),
    ("input:time", "inp[type=time]"),
    ("input:tel", "inp[type=tel]"),
    ("input:number", "inp[type=number]"),
    ("input:color", "inp[type=color]"),
    ("input:c|input:checkbox", "inp[type=checkbox]"),
    ("input:r|input:radio", "inp[type=radio]"),
    ("input:range", "inp[type=range]"),
    ("input:f|input:file", "inp[type=file]"),
    ("input:s|input:submit", "input[type=submit value]"),
    ("input:i|input:image", "input[type=image src alt]"),
    ("input:b|input:btn|input:button", "input[type=button value]"),
    ("input:reset", "input[type=reset value]"),
    ("select", "select[name=${1} id=${1}]"),
    ("select:d|select:disabled", "select[disabled.]"),
    ("opt|option", "option[value]"),
    ("textarea", "textarea[name=${1} id=${1} cols=${2:30} rows=${3:10}]"),
    ("marquee", "marquee[behavior direction]"),
    ("menu:c|menu:context", "menu[type=context]"),
    ("menu:t|menu:toolbar", "menu[type=toolbar]"),
    ("video", "video[src]"),
    ("audio", "audio[src]"),
    ("html:xml", "html[xmlns=http://www.w3.org/1999/xhtml]"),
    ("keygen", "keygen/"),
    ("command", "command/"),
    ("btn:s|button:s|button:submit", "button[type=submit]"),
    ("btn:r|button:r|button:reset", "button[type=reset]"),
    ("btn:b|button:b|button:button", "button[type=button]"),
    ("btn:d|button:d|button:disabled", "button[disabled.]"),
    ("fst:d|fset:d|fieldset:d|fieldset:disabled", "fieldset[disabled.]"),
    ("bq", "blockquote"),
    ("fig", "figure"),
    ("figc", "figcaption"),
    ("pic", "picture"),
    ("ifr", "iframe"),
    ("emb", "embed"),
    ("obj", "object"),
    ("cap", "caption"),
    ("colg", "colgroup"),
    ("fst|fset", "fieldset"),
    ("btn", "button"),
    ("optg", "optgroup"),
    ("tarea", "textarea"),
    ("leg", "legend"),
    ("sect", "section"),
    ("art", "article"),
    ("hdr", "header"),
    ("ftr", "footer"),
    ("adr", "address"),
    ("dlg", "dialog"),
    ("str", "strong"),
    ("prog", "progress"),
    ("mn", "main"),
    ("tem", "template"),
    ("datal", "datalist"),
    ("out", "output"),
    ("det", "details"),
    ("sum", "summary"),
    ("data", "data[value]"),
    ("meter", "meter[value]"),
    ("time", "time[datetime]"),
    ("ri:d|ri:dpr", "img:s"),
    ("ri:v|ri:viewport", "img:z"),
    ("ri:a|ri:art", "pic>src:m+img"),
    ("ri:t|ri:type", "pic>src:t+img"),
    ("!!!", "{<!DOCTYPE html>}"),
    (
        "doc",
        "html[lang=${lang}]>(head>meta[charset=${charset}]+meta:vp+title{${1:Document}})+body",
    ),
    ("!|html:5", "!!!+doc"),
    ("c", "{<!-- ${0} -->}"),
    ("cc:ie", "{<!--[if IE]>${0}<![endif]-->}"),
    ("cc:noie", "{<!--[if !IE]><!-->${0}<!--<![endif]-->}"),
];

pub const XSL: &[(&str, &str)] = &[
    ("tm|tmatch", "xsl:template[match mode]"),
    ("tn|tname", "xsl:template[name]"),
    ("call", "xsl:call-template[name]"),
    ("ap", "xsl:apply-templates[select mode]"),
    ("api", "xsl:apply-imports"),
    ("imp", "xsl:import[href]"),
    ("inc", "xsl:include[href]"),
    ("ch", "xsl:choose"),
    ("wh|xsl:when", "xsl:when[test]"),
    ("ot", "xsl:otherwise"),
    ("if", "xsl:if[test]"),
    ("par", "xsl:param[name]"),
    ("pare", "xsl:param[name select]"),
    ("var", "xsl:variable[name]"),
    ("vare", "xsl:variable[name select]"),
    ("wp", "xsl:with-param[name select]"),
    ("key", "xsl:key[name match use]"),
    ("elem", "xsl:element[name]"),
    ("attr", "xsl:attribute[name]"),
    ("attrs", "xsl:attribute-set[name]"),
    ("cp", "xsl:copy[select]"),
    ("co", "xsl:copy-of[select]"),
    ("val", "xsl:value-of[select]"),
    ("for|each", "xsl:for-each[select]"),
    ("tex", "xsl:text"),
    ("com", "xsl:comment"),
    ("msg", "xsl:message[terminate=no]"),
    ("fall", "xsl:fallback"),
    ("num", "xsl:number[value]"),
    ("nam", "namespace-alias[stylesheet-prefix result-prefix]"),
    ("pres", "xsl:preserve-space[elements]"),
    ("strip", "xsl:strip-space[elements]"),
    ("proc", "xsl:processing-instruction[name]"),
    ("sort", "xsl:sort[select order]"),
    ("choose", "xsl:choose>xsl:when+xsl:otherwise"),
    ("!!!", "{<?xml version=\"1.0\" encoding=\"UTF-8\"?>}"),
];

pub const CSS: &[(&str, &str)] = &[
    ("@f", "@font-face {\n\tfont-family: ${1};\n\tsrc: url(${2});\n}"),
    ("@i|@import", "@import url(${0});"),
    ("@kf", "@keyframes ${1:identifier} {\n\t${0}\n}"),
    ("@m|@media", "@media ${1:screen} {\n\t${0}\n}"),
    ("ac", "align-content:start|end|flex-start|flex-end|center|space-between|space-around|stretch|space-evenly"),
    ("ai", "align-items:start|end|flex-start|flex-end|center|baseline|stretch"),
    ("anim", "animation:${1:name} ${2:duration} ${3:timing-function} ${4:delay} ${5:iteration-count} ${6:direction} ${7:fill-mode}"),
    ("animdel", "animation-delay:time"),
    ("animdir", "animation-direction:normal|reverse|alternate|alternate-reverse"),
    ("animdur", "animation-duration:${1:0}s"),
    ("animfm", "animation-fill-mode:both|forwards|backwards"),
    ("animic", "animation-iteration-count:1|infinite"),
    ("animn", "animation-name"),
    ("animps", "animation-play-state:running|paused"),
    ("animtf", "animation-timing-function:linear|ease|ease-in|ease-out|ease-in-out|cubic-bezier(${1:0.1}, ${2:0.7}, ${3:1.0}, ${3:0.1})"),
    ("ap", "appearance:none"),
    ("as", "align-self:start|end|auto|flex-start|flex-end|center|baseline|stretch"),
    ("b", "bottom"),
    ("bd", "border:${1:1px} ${2:solid} ${3:#000}"),
    ("bdb", "border-bottom:${1:1px} ${2:solid} ${3:#000}"),
    ("bdbc", "border-bottom-color:${1:#000}"),
    ("bdbi", "border-bottom-image:url(${0})"),
    ("bdblrs", "border-bottom-left-radius"),
    ("bdbrrs", "border-bottom-right-radius"),
    ("bdbs", "border-bottom-style"),
    ("bdbw", "border-bottom-width"),
    ("bdc", "border-color:${1:#000}"),
    ("bdcl", "border-collapse:collapse|separate"),
    ("bdi", "border-image:url(${0})"),
    ("bdl", "border-left:${1:1px} ${2:solid} ${3:#000}"),
    ("bdlc", "border-left-color:${1:#000}"),
    ("bdls", "border-left-style"),
    ("bdlw", "border-left-width"),
    ("bdr", "border-right:${1:1px} ${2:solid} ${3:#000}"),
    ("bdrc", "border-right-color:${1:#000}"),
    ("bdrs", "border-radius"),
    ("bdrst", "border-right-style"),
    ("bdrw", "border-right-width"),
    ("bds", "border-style:none|hidden|dotted|dashed|solid|double|groove|ridge|inset|outset"),
    ("bdsp", "border-spacing"),
    ("bdt", "border-top:${1:1px} ${2:solid} ${3:#000}"),
    ("bdtc", "border-top-color:${1:#000}"),
    ("bdtlrs", "border-top-left-radius"),
    ("bdtrrs", "border-top-right-radius"),
    ("bdts", "border-top-style"),
    ("bdtw", "border-top-width"),
    ("bdw", "border-width"),
    ("bfv", "backface-visibility:hidden|visible"),
    ("bg", "background:${1:#000}"),
    ("bg:n", "background: none"),
    ("bga", "background-attachment:fixed|scroll"),
    ("bgc", "background-color:${1:#fff}"),
    ("bgcp", "background-clip:padding-box|border-box|content-box|no-clip"),
    ("bgi", "background-image:url(${0})"),
    ("bgo", "background-origin:padding-box|border-box|content-box"),
    ("bgp", "background-position:${1:0} ${2:0}"),
    ("bgpx", "background-position-x"),
    ("bgpy", "background-position-y"),
    ("bgr", "background-repeat:no-repeat|repeat-x|repeat-y|space|round"),
    ("bgsz", "background-size:contain|cover"),
    ("bxsh", "box-shadow:${1:inset }${2:hoff} ${3:voff} ${4:blur} ${5:#000}|none"),
    ("bxsz", "box-sizing:border-box|content-box"),
    ("c", "color:${1:#000}"),
    ("cr", "color:rgb(${1:0}, ${2:0}, ${3:0})"),
    ("cra", "color:rgba(${1:0}, ${2:0}, ${3:0}, ${4:.5})"),
    ("cl", "clear:both|left|right|none"),
    ("cm", "/* ${0} */"),
    ("cnt", "content:'${0}'|normal|open-quote|no-open-quote|close-quote|no-close-quote|attr(${0})|counter(${0})|counters(${0})"),
    ("coi", "counter-increment"),
    ("colm", "columns"),
    ("colmc", "column-count"),
    ("colmf", "column-fill"),
    ("colmg", "column-gap"),
    ("colmr", "column-rule"),
    ("colmrc", "column-rule-color"),
    ("colmrs", "column-rule-style"),
    ("colmrw", "column-rule-width"),
    ("colms", "column-span"),
    ("colmw", "column-width"),
    ("cor", "counter-reset"),
    ("cp", "clip:auto|rect(${1:top} ${2:right} ${3:bottom} ${4:left})"),
    ("cps", "caption-side:top|bottom"),
    ("cur", "cursor:pointer|auto|default|crosshair|hand|help|move|text"),
    ("d", "display:block|none|flex|inline-flex|inline|inline-block|grid|inline-grid|subgrid|list-item|run-in|contents|table|inline-table|table-caption|table-column|table-column-group|table-header-group|table-footer-group|table-row|table-row-group|table-cell|ruby|ruby-base|ruby-base-group|ruby-text|ruby-text-group"),
    ("ec", "empty-cells:show|hide"),
    ("f", "font:${1:1em} ${2:sans-serif}"),
    ("fd", "font-display:auto|block|swap|fallback|optional"),
    ("ff", "font-family:serif|sans-serif|cursive|fantasy|monospace"),
    ("fl", "float:left|right|none"),
    ("fs", "font-style:italic|normal|oblique"),
    ("fsm", "font-smoothing:antialiased|subpixel-antialiased|none"),
    ("fst", "font-stretch:normal|ultra-condensed|extra-condensed|condensed|semi-condensed|semi-expanded|expanded|extra-expanded|ultra-expanded"),
    ("fv", "font-variant:normal|small-caps"),
    ("fw", "font-weight:normal|bold|bolder|lighter"),
    ("fx", "flex"),
    ("fxb", "flex-basis:fill|max-content|min-content|fit-content|content"),
    ("fxd", "flex-direction:row|row-reverse|column|column-reverse"),
    ("fxf", "flex-flow"),
    ("fxg", "flex-grow"),
    ("fxsh", "flex-shrink"),
    ("fxw", "flex-wrap:nowrap|wrap|wrap-reverse"),
    ("fsz", "font-size"),
    ("fsza", "font-size-adjust"),
    ("gtc", "grid-template-columns:repeat(${0})|minmax()"),
    ("gtr", "grid-template-rows:repeat(${0})|minmax()"),
    ("gta", "grid-template-areas"),
    ("gt", "grid-template"),
    ("gg", "grid-gap"),
    ("gcg", "grid-column-gap"),
    ("grg", "grid-row-gap"),
    ("gac", "grid-auto-columns:auto|minmax()"),
    ("gar", "grid-auto-rows:auto|minmax()"),
    ("gaf", "grid-auto-flow:row|column|dense"),
    ("gd", "grid"),
    ("gc", "grid-column"),
    ("gcs", "grid-column-start"),
    ("gce", "grid-column-end"),
    ("gr", "grid-row"),
    ("grs", "grid-row-start"),
    ("gre", "grid-row-end"),
    ("ga", "grid-area"),
    ("h", "height"),
    ("jc", "justify-content:start|end|stretch|flex-start|flex-end|center|space-between|space-around|space-evenly"),
    ("ji", "justify-items:start|end|center|stretch"),
    ("js", "justify-self:start|end|center|stretch"),
    ("l", "left"),
    ("lg", "background-image:linear-gradient(${1})"),
    ("lh", "line-height"),
    ("lis", "list-style"),
    ("lisi", "list-style-image"),
    ("lisp", "list-style-position:inside|outside"),
    ("list", "list-style-type:disc|circle|square|decimal|decimal-leading-zero|lower-roman|upper-roman"),
    ("lts", "letter-spacing:normal"),
    ("m", "margin"),
    ("mah", "max-height"),
    ("maw", "max-width"),
    ("mb", "margin-bottom"),
    ("mih", "min-height"),
    ("miw", "min-width"),
    ("ml", "margin-left"),
    ("mr", "margin-right"),
    ("mt", "margin-top"),
    ("ol", "outline"),
    ("olc", "outline-color:${1:#000}|invert"),
    ("olo", "outline-offset"),
    ("ols", "outline-style:none|dotted|dashed|solid|double|groove|ridge|inset|outset"),
    ("olw", "outline-width:thin|medium|thick"),
    ("op|opa", "opacity"),
    ("ord", "order"),
    ("ov", "overflow:hidden|visible|scroll|auto"),
    ("ovx", "overflow-x:hidden|visible|scroll|auto"),
    ("ovy", "overflow-y:hidden|visible|scroll|auto"),
    ("p", "padding"),
    ("pb", "padding-bottom"),
    ("pgba", "page-break-after:auto|always|left|right"),
    ("pgbb", "page-break-before:auto|always|left|right"),
    ("pgbi", "page-break-inside:auto|avoid"),
    ("pl", "padding-left"),
    ("pos", "position:relative|absolute|fixed|static|sticky"),
    ("pr", "padding-right"),
    ("pt", "padding-top"),
    ("q", "quotes"),
    ("r", "right"),
    ("rsz", "resize:none|both|horizontal|vertical"),
    ("t", "top"),
    ("ta", "text-align:left|center|right|justify"),
    ("tal", "text-align-last:left|center|right"),
    ("tbl", "table-layout:fixed"),
    ("td", "text-decoration:none|underline|overline|line-through"),
    ("ti", "text-indent"),
    ("tov", "text-overflow:ellipsis|clip"),
    ("trf", "transform:${1}|skewX(${1:angle})|skewY(${1:angle})|scale(${1:x}, ${2:y})|scaleX(${1:x})|scaleY(${1:y})|rotate(${1:angle})|translate(${1:x}, ${2:y})|translateX(${1:x})|translateY(${1:y})"),
    ("trfo", "transform-origin"),
    ("trfs", "transform-style:preserve-3d"),
    ("trs", "transition:${1:prop} ${2:time}"),
    ("trsde", "transition-delay:${1:time}"),
    ("trsdu", "transition-duration:${1:time}"),
    ("trsp", "transition-property:${1:prop}"),
    ("trstf", "transition-timing-function:${1:fn}"),
    ("tsh", "text-shadow:${1:hoff} ${2:voff} ${3:blur} ${4:#000}"),
    ("tt", "text-transform:uppercase|lowercase|capitalize|none"),
    ("us", "user-select:none"),
    ("v", "visibility:hidden|visible|collapse"),
    ("va", "vertical-align:top|super|text-top|middle|baseline|bottom|text-bottom|sub"),
    ("w", "width"),
    ("whs", "white-space:nowrap|pre|pre-wrap|pre-line|normal"),
    ("wob", "word-break:normal|keep-all|break-all"),
    ("wos", "word-spacing"),
    ("wow", "word-wrap:none|unrestricted|suppress|break-word|normal"),
    ("z", "z-index"),
    ("zm", "zoom:1"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases_expand() {
        let snippets = builtin(SyntaxType::Markup, "html");
        assert_eq!(snippets["src"], snippets["source"]);
        assert_eq!(snippets["!"], "!!!+doc");
    }

    #[test]
    fn test_xsl_overlays_html() {
        let snippets = builtin(SyntaxType::Markup, "xsl");
        assert_eq!(snippets["if"], "xsl:if[test]");
        assert!(snippets["!!!"].contains("<?xml"));
        assert_eq!(snippets["a"], "a[href]");
    }

    #[test]
    fn test_stylesheet_table() {
        let snippets = builtin(SyntaxType::Stylesheet, "css");
        assert_eq!(snippets["bd"], "border:${1:1px} ${2:solid} ${3:#000}");
        assert!(!snippets.contains_key("a"));
    }
}
