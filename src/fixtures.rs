// Shared test pages, trimmed copies of real registry markup

pub const SAMPLE_PROFILE_ID: &str = "110391";

pub const SAMPLE_PROFILE: &str = r#"
<html><body>
<table>
<tr><td>Name</td><td><a href="/view_pedigree?id=110391">HEART SKIPS PHOENIX BEAUTY</a> (click to view pedigree)</td></tr>
<tr><td>Gender</td><td>female</td></tr>
<tr><td>Father</td><td><a href="/view_dog?id=87626">UNION LA MIA FORTUNA BE COME THE STAR DRAGON</a></td></tr>
<tr><td>Mother</td><td><a href="/view_dog?id=85609">ENIGMA BLUE STAR PHOENIX BEAUTY</a></td></tr>
<tr><td>Dog Parental DNA Confirmed</td><td>No</td></tr>
<tr><td>Ped#</td><td>LV-47136/19</td></tr>
<tr><td>Titles</td><td></td></tr>
<tr><td>Extra titles</td><td>LV, LT, EST, Baltic JCH; LV, LT, EST, Baltic CH</td></tr>
<tr><td>DOB</td><td>2019/06/24</td></tr>
<tr><td>Colour</td><td>Grey brindle/Grigio tigrato</td></tr>
<tr><td>HD</td><td>HD A</td></tr>
<tr><td>ED</td><td>0/Free/Vrij</td></tr>
<tr><td>Heart</td><td></td></tr>
<tr><td>Date of death</td><td>YYYY/MM/DD</td></tr>
<tr><td>Other healthscores</td><td></td></tr>
<tr><td>DNA PROFILE</td><td></td></tr>
<tr><td>DSRA Result</td><td>CLEAR</td></tr>
<tr><td>DSRA Result Certified</td><td>YES</td></tr>
<tr><td>DVL2 Result</td><td>UNKNOWN</td></tr>
<tr><td>DVL2 Result Certified</td><td>NO</td></tr>
<tr><td>DNA Test Inbred percentage</td><td></td></tr>
<tr><td>Inbred percentage</td><td><a href="/view_coi?dogId=110391">6.887995486613363%</a></td></tr>
<tr><td>Added by</td><td>vilma</td></tr>
</table>

<table>
<tr><td>children</td></tr>
<tr><td>
  <table>
    <tr><th>Name</th><th>Ped#</th><th>Titles</th><th>DOB</th><th>Colour</th><th>HD</th><th>ED</th></tr>
    <tr><td><a href="/view_dog?id=120001">PHOENIX BEAUTY ALFA</a></td><td>LV-50001/21</td><td></td><td>2021/03/02</td><td>Black</td><td>HD A</td><td>0/Free/Vrij</td></tr>
    <tr><td><a href="/view_dog?id=120002">PHOENIX BEAUTY BRAVO</a></td><td>LV-50002/21</td><td>JCH</td><td>2021/03/02</td><td>Grey</td><td>HD B</td><td>ED 1</td></tr>
    <tr><td>short row</td><td>x</td></tr>
  </table>
</td></tr>
<tr><td>Brothers and sisters</td></tr>
<tr><td>
  <table>
    <tr><th>Name</th><th>Ped#</th><th>Titles</th><th>DOB</th><th>Colour</th><th>HD</th><th>ED</th></tr>
    <tr><td><a href="/view_dog?id=110392">HEART SKIPS PHOENIX BOLD</a></td><td>LV-47137/19</td><td></td><td>2019/06/24</td><td>Black brindle</td><td>HD B</td><td>Unknown</td></tr>
    <tr><td><a href="/view_dog?id=110391">HEART SKIPS PHOENIX BEAUTY</a></td><td>LV-47136/19</td><td></td><td>2019/06/24</td><td>Grey brindle</td><td>HD A</td><td>0/Free/Vrij</td></tr>
  </table>
</td></tr>
</table>
</body></html>
"#;

pub const SAMPLE_SEARCH: &str = r#"
<html><body>
<table>
<tr><th>Name</th><th>Ped#</th><th>Titles</th><th>DOB</th><th>Colour</th><th>HD</th><th>ED</th></tr>
<tr><td><a href="/view_dog?id=110391">HEART SKIPS PHOENIX BEAUTY</a></td><td>LV-47136/19</td><td></td><td>2019/06/24</td><td>Grey brindle/Grigio tigrato</td><td>HD A</td><td>0/Free/Vrij</td></tr>
<tr><td colspan="7">&nbsp;</td></tr>
<tr><td><a href="/view_dog?id=110392">HEART SKIPS PHOENIX BOLD</a></td><td>LV-47137/19</td><td>JCH</td><td>2019/06/24</td><td>Black brindle</td><td>HD B</td><td>Unknown</td></tr>
<tr><td><a href="/news?id=5">Not a dog</a></td><td></td></tr>
</table>
</body></html>
"#;

pub const SINGLE_SEARCH: &str = r#"
<table>
<tr><th>Name</th><th>Ped#</th></tr>
<tr><td><a href="/view_dog?id=110391">HEART SKIPS PHOENIX BEAUTY</a></td><td>LV-47136/19</td><td></td><td>2019/06/24</td><td>Grey</td><td>HD A</td><td>0/Free/Vrij</td></tr>
</table>
"#;

pub const EMPTY_SEARCH: &str = r#"
<table>
<tr><th>Name</th><th>Ped#</th><th>Titles</th><th>DOB</th><th>Colour</th><th>HD</th><th>ED</th></tr>
</table>
"#;
